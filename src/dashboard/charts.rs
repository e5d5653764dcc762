//! The revenue bar chart.
//!
//! The chart is drawn by ECharts from options built with `charming`. Browsers
//! without JavaScript get a plain HTML bar chart instead.

use charming::{
    Chart,
    component::{Axis, Grid, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::Bar,
};
use maud::{Markup, PreEscaped, html};

use crate::{
    dashboard::revenue::{Revenue, Y_AXIS_STEP, generate_y_axis},
    html::HeadElement,
};

/// The height of the HTML fallback chart in pixels.
const CHART_HEIGHT: i64 = 350;

pub(super) const REVENUE_CHART_ID: &str = "revenue-chart";

/// Build the ECharts options for the monthly revenue bar chart.
pub(super) fn revenue_chart(revenue: &[Revenue]) -> Chart {
    let (_, top_label) = generate_y_axis(revenue);
    let months: Vec<String> = revenue.iter().map(|record| record.month.clone()).collect();
    let values: Vec<f64> = revenue.iter().map(|record| record.revenue as f64).collect();

    Chart::new()
        .title(Title::new().text("Recent Revenue").subtext("Last 12 months"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(months))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .min(0.0)
                .max(top_label as f64)
                .interval(Y_AXIS_STEP as f64)
                .axis_label(AxisLabel::new().formatter(thousands_formatter())),
        )
        .series(Bar::new().name("Revenue").data(values))
}

/// Format axis values in thousands of dollars, e.g. 3000 becomes "$3K".
fn thousands_formatter() -> JsFunction {
    JsFunction::new_with_args("number", "return '$' + (number / 1000) + 'K';")
}

/// The script that draws the chart once the page has loaded.
pub(super) fn chart_script(options: &str) -> HeadElement {
    let script = format!(
        r#"document.addEventListener('DOMContentLoaded', function() {{
            const chartDom = document.getElementById("{REVENUE_CHART_ID}");
            const chart = echarts.init(chartDom);
            chart.setOption({options});

            window.addEventListener('resize', chart.resize);

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
            }};
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }});"#
    );

    HeadElement::ScriptSource(PreEscaped(script))
}

/// The height in pixels of the fallback bar for `revenue`.
fn bar_height(revenue: i64, top_label: i64) -> i64 {
    if top_label <= 0 {
        return 0;
    }

    CHART_HEIGHT * revenue.max(0) / top_label
}

/// A bar chart drawn with plain HTML, for browsers without JavaScript.
fn fallback_chart(revenue: &[Revenue]) -> Markup {
    let (y_axis_labels, top_label) = generate_y_axis(revenue);

    html! {
        div
            class="grid grid-cols-12 items-end gap-2 rounded-md bg-white dark:bg-gray-700 p-4 sm:grid-cols-13 md:gap-4"
        {
            div
                class="mb-6 hidden flex-col justify-between text-sm text-gray-400 sm:flex"
                style={ "height: " (CHART_HEIGHT) "px" }
            {
                @for label in &y_axis_labels {
                    p data-y-axis-label="true" { (label) }
                }
            }

            @for record in revenue {
                div class="flex flex-col items-center gap-2"
                {
                    div
                        data-revenue-bar="true"
                        class="w-full rounded-md bg-blue-300"
                        style={ "height: " (bar_height(record.revenue, top_label)) "px" }
                    {}

                    p class="-rotate-90 text-sm text-gray-400 sm:rotate-0" { (record.month) }
                }
            }
        }
    }
}

pub(super) fn revenue_chart_view(revenue: &[Revenue]) -> Markup {
    html! {
        section id="revenue" class="w-full md:col-span-4"
        {
            h2 class="mb-4 text-xl font-semibold" { "Recent Revenue" }

            div class="rounded-xl bg-gray-100 dark:bg-gray-800 p-4"
            {
                @if revenue.is_empty() {
                    p class="mt-4 text-gray-400" { "No data available." }
                } @else {
                    div id=(REVENUE_CHART_ID) class="min-h-[380px] rounded dark:bg-gray-100" {}

                    noscript
                    {
                        (fallback_chart(revenue))
                    }

                    div class="flex items-center pb-2 pt-6"
                    {
                        h3 class="ml-2 text-sm text-gray-500" { "Last 12 months" }
                    }
                }
            }
        }
    }
}
