//! Category model, form validation and the category pickers used by other pages.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    api::{ApiClient, Session},
    endpoints,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    record::RecordKind,
};

/// An expense or income category.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// The form for creating or renaming a category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// The body the backend expects when creating or updating a category.
#[derive(Debug, PartialEq, Serialize)]
pub(super) struct CategoryRequest<'a> {
    pub(super) name: &'a str,
    pub(super) description: Option<&'a str>,
}

impl CategoryForm {
    pub(super) fn validate(&self) -> Result<CategoryRequest<'_>, Error> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::Validation(
                "The category name cannot be empty".to_owned(),
            ));
        }

        let description = self.description.trim();

        Ok(CategoryRequest {
            name,
            description: (!description.is_empty()).then_some(description),
        })
    }
}

/// Fetch every category of `kind`.
pub async fn get_categories(
    api: &ApiClient,
    session: &Session,
    kind: RecordKind,
) -> Result<Vec<Category>, Error> {
    api.get_json(session, kind.category_api_path(), &[]).await
}

/// The page for editing the category `category_id` of `kind`.
pub fn edit_category_url(kind: RecordKind, category_id: i64) -> String {
    match kind {
        RecordKind::Expense => {
            endpoints::format_endpoint(endpoints::EDIT_EXPENSE_CATEGORY_VIEW, category_id)
        }
        RecordKind::Income => {
            endpoints::format_endpoint(endpoints::EDIT_INCOME_CATEGORY_VIEW, category_id)
        }
    }
}

/// The htmx endpoint for updating or deleting a category.
pub fn category_url(kind: RecordKind, category_id: i64) -> String {
    match kind {
        RecordKind::Expense => {
            endpoints::format_endpoint(endpoints::EXPENSE_CATEGORY, category_id)
        }
        RecordKind::Income => endpoints::format_endpoint(endpoints::INCOME_CATEGORY, category_id),
    }
}

/// The htmx endpoint for creating a category.
pub fn create_category_url(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Expense => endpoints::POST_EXPENSE_CATEGORY,
        RecordKind::Income => endpoints::POST_INCOME_CATEGORY,
    }
}

/// A drop-down for choosing one category. The first option is an empty placeholder.
pub fn category_select(
    name: &str,
    categories: &[Category],
    selected: Option<i64>,
    required: bool,
) -> Markup {
    html! {
        select name=(name) required[required] class=(FORM_TEXT_INPUT_STYLE)
        {
            option value="" { "Select a category" }

            @for category in categories {
                option value=(category.id) selected[Some(category.id) == selected]
                {
                    (category.name)
                }
            }
        }
    }
}

/// A labelled multi-select. Selecting nothing means no category filter.
pub fn category_multi_select(
    name: &str,
    label: &str,
    categories: &[Category],
    selected: &[i64],
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            select
                id=(name)
                name=(name)
                multiple
                size=(categories.len().clamp(2, 6))
                class=(FORM_TEXT_INPUT_STYLE)
            {
                @for category in categories {
                    option value=(category.id) selected[selected.contains(&category.id)]
                    {
                        (category.name)
                    }
                }
            }
        }
    }
}
