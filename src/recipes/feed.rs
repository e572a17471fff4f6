use uuid::Uuid;

use crate::{
    data::{DataClient, RecipeQuery},
    recipes::{repo_types::RecipeWithAuthor, services::load_recipes},
};

/// Community feed: every recipe, newest first, narrowed by a name search.
#[derive(Debug, Default)]
pub struct FeedController {
    recipes: Vec<RecipeWithAuthor>,
    query: String,
    selected: Option<Uuid>,
}

impl FeedController {
    /// Fetches the feed. A failed fetch leaves the feed empty.
    pub async fn load(data: &dyn DataClient) -> Self {
        Self::from_recipes(load_recipes(data, RecipeQuery::all()).await)
    }

    pub fn from_recipes(recipes: Vec<RecipeWithAuthor>) -> Self {
        Self {
            recipes,
            ..Self::default()
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Recipes whose name contains the query, ignoring case.
    pub fn visible(&self) -> Vec<&RecipeWithAuthor> {
        filter_by_name(&self.recipes, &self.query)
    }

    /// Opens the detail view for an already fetched recipe. Unknown ids leave
    /// the selection unchanged.
    pub fn select(&mut self, id: Uuid) -> bool {
        let found = self.recipes.iter().any(|r| r.recipe.id == id);
        if found {
            self.selected = Some(id);
        }
        found
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&RecipeWithAuthor> {
        let id = self.selected?;
        self.recipes.iter().find(|r| r.recipe.id == id)
    }
}

pub fn matches_query(name: &str, query: &str) -> bool {
    query.is_empty() || name.to_lowercase().contains(&query.to_lowercase())
}

pub fn filter_by_name<'a>(
    recipes: &'a [RecipeWithAuthor],
    query: &str,
) -> Vec<&'a RecipeWithAuthor> {
    recipes
        .iter()
        .filter(|r| matches_query(&r.recipe.name, query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::repo_types::Recipe;
    use time::OffsetDateTime;

    fn recipe(name: &str) -> RecipeWithAuthor {
        RecipeWithAuthor {
            recipe: Recipe {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                name: name.into(),
                image_url: None,
                ingredients: vec!["flour".into()],
                instructions: vec!["bake".into()],
                cooking_time: None,
                category: None,
                created_at: OffsetDateTime::now_utc(),
                updated_at: OffsetDateTime::now_utc(),
            },
            author_username: None,
        }
    }

    fn names(recipes: Vec<&RecipeWithAuthor>) -> Vec<&str> {
        recipes.into_iter().map(|r| r.recipe.name.as_str()).collect()
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let mut feed =
            FeedController::from_recipes(vec![recipe("Apple Pie"), recipe("Apple Crumble")]);

        feed.set_query("apple");
        assert_eq!(names(feed.visible()), vec!["Apple Pie", "Apple Crumble"]);

        feed.set_query("pie");
        assert_eq!(names(feed.visible()), vec!["Apple Pie"]);

        feed.set_query("PIE");
        assert_eq!(names(feed.visible()), vec!["Apple Pie"]);

        feed.set_query("rhubarb");
        assert!(feed.visible().is_empty());
    }

    #[test]
    fn empty_query_shows_everything_in_fetch_order() {
        let feed = FeedController::from_recipes(vec![recipe("B"), recipe("A"), recipe("C")]);
        assert_eq!(names(feed.visible()), vec!["B", "A", "C"]);
    }

    #[test]
    fn filter_matches_exactly_the_containing_names() {
        let all = vec![
            recipe("Crème Brûlée"),
            recipe("creme caramel"),
            recipe("Brûlée Toast"),
            recipe("Pancakes"),
        ];
        for query in ["", "c", "crè", "BRÛLÉE", "toast", "zz"] {
            let expected: Vec<&str> = all
                .iter()
                .map(|r| r.recipe.name.as_str())
                .filter(|n| n.to_lowercase().contains(&query.to_lowercase()))
                .collect();
            assert_eq!(names(filter_by_name(&all, query)), expected, "query {query:?}");
        }
    }

    #[test]
    fn selecting_uses_the_fetched_list() {
        let pie = recipe("Apple Pie");
        let pie_id = pie.recipe.id;
        let mut feed = FeedController::from_recipes(vec![pie, recipe("Soup")]);

        assert!(feed.selected().is_none());
        assert!(feed.select(pie_id));
        assert_eq!(feed.selected().unwrap().recipe.name, "Apple Pie");

        assert!(!feed.select(Uuid::new_v4()));
        assert_eq!(feed.selected().unwrap().recipe.id, pie_id);

        feed.close_detail();
        assert!(feed.selected().is_none());
    }
}
