//! The summary cards at the top of the dashboard.

use maud::{Markup, html};

use crate::{dashboard::core::FinanceDashboard, html::{CARD_STYLE, format_optional_currency}};

pub(super) fn summary_cards(dashboard: &FinanceDashboard) -> Markup {
    let savings_goal = format!(
        "Goal: {}",
        format_optional_currency(dashboard.total_savings_goal)
    );

    html! {
        section id="summary-cards" class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4 w-full mb-6"
        {
            (card("Total income", dashboard.total_income, None))
            (card("Total expenses", dashboard.total_expenses, None))
            (card("Net balance", dashboard.net_balance, None))
            (card("Savings progress", dashboard.savings_progress, Some(&savings_goal)))
        }
    }
}

fn card(title: &str, amount: Option<f64>, footnote: Option<&str>) -> Markup {
    let amount_style = match amount {
        Some(amount) if amount < 0.0 => "text-red-600 dark:text-red-400",
        _ => "text-gray-900 dark:text-white",
    };

    html! {
        div class=(CARD_STYLE) aria-label=(title)
        {
            h3 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
            p class={ "mt-1 text-2xl font-semibold " (amount_style) }
            {
                (format_optional_currency(amount))
            }

            @if let Some(footnote) = footnote {
                p class="mt-1 text-xs text-gray-500 dark:text-gray-400" { (footnote) }
            }
        }
    }
}
