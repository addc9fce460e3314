//! Dashboard charts.
//!
//! Each chart is built with charming and serialized to an ECharts option
//! object, which [charts_script] hands to `echarts.init` once the page loads:
//! - **Expenses by category** and **Incomes by category**: pie charts
//! - **Cash flow**: actual income against actual expenses per budget month
//! - **Expense trend**: one line per expense category over the months

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, JsFunction,
        Tooltip, Trigger,
    },
    series::{Bar, Line, Pie},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    budget::Budget,
    dashboard::core::{Summary, cash_flow_series, trend_series},
    html::HeadElement,
};

/// The ECharts build used by the dashboard.
pub(super) const ECHARTS_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// The four dashboard charts, in display order.
pub(super) fn dashboard_charts(
    expense_summary: Option<&Summary>,
    income_summary: Option<&Summary>,
    budgets: &[Budget],
) -> [DashboardChart; 4] {
    [
        DashboardChart {
            id: "expense-pie-chart",
            options: category_pie_chart("Expenses by category", expense_summary).to_string(),
        },
        DashboardChart {
            id: "income-pie-chart",
            options: category_pie_chart("Incomes by category", income_summary).to_string(),
        },
        DashboardChart {
            id: "cash-flow-chart",
            options: cash_flow_chart(budgets).to_string(),
        },
        DashboardChart {
            id: "expense-trend-chart",
            options: expense_trend_chart(expense_summary).to_string(),
        },
    ]
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

pub(super) fn category_pie_chart(title: &str, summary: Option<&Summary>) -> Chart {
    let data: Vec<(f64, &str)> = summary
        .map(|summary| {
            summary
                .totals_by_category
                .iter()
                .map(|total| (total.total_amount, total.label()))
                .collect()
        })
        .unwrap_or_default();

    Chart::new()
        .title(Title::new().text(title).left("center"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().bottom("1%"))
        .series(
            Pie::new()
                .name(title)
                .radius(vec!["40%", "70%"])
                .data(data),
        )
}

pub(super) fn cash_flow_chart(budgets: &[Budget]) -> Chart {
    let (labels, income, expense) = cash_flow_series(budgets);

    Chart::new()
        .title(
            Title::new()
                .text("Cash flow")
                .subtext("Actual income and expenses per budget month"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().right("4%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Bar::new().name("Income").data(income))
        .series(Bar::new().name("Expenses").data(expense))
}

pub(super) fn expense_trend_chart(summary: Option<&Summary>) -> Chart {
    let (months, series) = summary
        .map(|summary| trend_series(&summary.category_monthly_totals))
        .unwrap_or_default();
    let labels: Vec<String> = months.iter().map(|month| month.label()).collect();

    let mut chart = Chart::new()
        .title(
            Title::new()
                .text("Expense trend")
                .subtext("Monthly totals per category"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().left(200).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        );

    for (category, values) in series {
        chart = chart.series(
            Line::new()
                .name(category)
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(values),
        );
    }

    chart
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('ru-RU', {
              style: 'currency',
              currency: 'RUB'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod chart_tests {
    use serde_json::json;

    use crate::dashboard::core::Summary;

    use super::{category_pie_chart, expense_trend_chart};

    /// The chart options with whitespace removed.
    fn compact(chart: charming::Chart) -> String {
        chart.to_string().split_whitespace().collect()
    }

    fn summary() -> Summary {
        serde_json::from_value(json!({
            "totalAmount": 300,
            "totalsByCategory": [
                {"categoryId": 1, "categoryName": "Food", "totalAmount": 200, "percentage": 66.7},
                {"categoryId": null, "categoryName": null, "totalAmount": 100, "percentage": 33.3}
            ],
            "categoryMonthlyTotals": [
                {"categoryId": 1, "categoryName": "Food", "monthlyTotals": [
                    {"period": "2025-01", "totalAmount": 200}
                ]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn pie_names_uncategorized_slice() {
        let text = compact(category_pie_chart("Expenses by category", Some(&summary())));

        assert!(text.contains("\"Food\""), "got {text}");
        assert!(text.contains("\"Uncategorized\""), "got {text}");
    }

    #[test]
    fn trend_has_a_line_per_category() {
        let text = compact(expense_trend_chart(Some(&summary())));

        assert!(text.contains("\"Jan2025\""), "got {text}");
        assert_eq!(text.matches("\"type\":\"line\"").count(), 1, "got {text}");
    }

    #[test]
    fn charts_without_data_have_no_series() {
        let text = compact(expense_trend_chart(None));

        assert!(!text.contains("\"type\":\"line\""), "got {text}");
    }
}
