use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

use motivate_core::models::decision::EndDecision;
use motivate_core::models::score::ScoreBreakdown;

use crate::error::ExportError;

const REPORT_TEMPLATE_NAME: &str = "report";

/// Built-in report layout. Custom templates see the same context.
pub const DEFAULT_TEMPLATE: &str = r#"MI Practice Report
==================
Rubric: {{ rubric_version }}
Score:  {{ total_score | round(precision=1) }} / {{ total_possible }} ({{ percentage | round(precision=1) }}%)
Band:   {{ band }}
{% if engagement_multiplier or timing_multiplier %}
Modifiers:{% if engagement_multiplier %} engagement x{{ engagement_multiplier | round(precision=2) }}{% endif %}{% if timing_multiplier %} timing x{{ timing_multiplier | round(precision=2) }}{% endif %}
{% endif %}
Categories
----------
{% for c in categories -%}
- {{ c.name }}: {{ c.status }} ({{ c.earned_points | round(precision=1) }}/{{ c.max_points }}){% if c.comment %}
    {{ c.comment }}{% endif %}
{% endfor -%}
{% if missing_categories %}
Not evaluated: {{ missing_categories | join(sep=", ") }}
{% endif -%}
{% if decision %}
Session end: {% if decision.allow_end %}allowed{% else %}blocked{% endif %} ({{ decision.reason }})
{% if decision.missing_requirements %}Outstanding: {{ decision.missing_requirements | join(sep=", ") }}
{% endif %}{% endif -%}
"#;

/// Flattened view handed to templates. Statuses are rendered with their
/// human-readable labels.
#[derive(Debug, Serialize)]
struct ReportContext<'a> {
    rubric_version: &'static str,
    total_score: f64,
    total_possible: f64,
    percentage: f64,
    base_score: f64,
    band: &'a str,
    engagement_multiplier: Option<f64>,
    timing_multiplier: Option<f64>,
    categories: Vec<CategoryView<'a>>,
    missing_categories: &'a [String],
    decision: Option<&'a EndDecision>,
}

#[derive(Debug, Serialize)]
struct CategoryView<'a> {
    name: &'a str,
    status: &'static str,
    earned_points: f64,
    max_points: f64,
    comment: &'a str,
}

impl<'a> ReportContext<'a> {
    fn new(score: &'a ScoreBreakdown, decision: Option<&'a EndDecision>) -> Self {
        Self {
            rubric_version: score.rubric_version.as_str(),
            total_score: score.total_score,
            total_possible: score.total_possible,
            percentage: score.percentage,
            base_score: score.base_score,
            band: &score.performance_band.label,
            engagement_multiplier: score.modifiers_applied.engagement_multiplier,
            timing_multiplier: score.modifiers_applied.timing_multiplier,
            categories: score
                .categories
                .iter()
                .map(|c| CategoryView {
                    name: &c.name,
                    status: c.status.label(),
                    earned_points: c.earned_points,
                    max_points: c.max_points,
                    comment: &c.comment,
                })
                .collect(),
            missing_categories: &score.missing_categories,
            decision,
        }
    }
}

/// Render a plain-text report.
///
/// `template` is a raw Tera template; `None` uses [`DEFAULT_TEMPLATE`].
pub fn render_report(
    score: &ScoreBreakdown,
    decision: Option<&EndDecision>,
    template: Option<&str>,
) -> Result<String, ExportError> {
    let mut tera = Tera::default();
    tera.add_raw_template(REPORT_TEMPLATE_NAME, template.unwrap_or(DEFAULT_TEMPLATE))
        .map_err(|e| ExportError::TemplateParse(e.to_string()))?;

    let value = serde_json::to_value(ReportContext::new(score, decision))?;
    let context =
        Context::from_value(value).map_err(|e| ExportError::TemplateRender(e.to_string()))?;

    let rendered = tera.render(REPORT_TEMPLATE_NAME, &context)?;
    debug!(
        bytes = rendered.len(),
        custom_template = template.is_some(),
        "rendered report"
    );
    Ok(rendered)
}

/// Serialize the breakdown (and decision, when given) as pretty JSON.
pub fn render_json(
    score: &ScoreBreakdown,
    decision: Option<&EndDecision>,
) -> Result<String, ExportError> {
    #[derive(Serialize)]
    struct JsonReport<'a> {
        score: &'a ScoreBreakdown,
        #[serde(skip_serializing_if = "Option::is_none")]
        decision: Option<&'a EndDecision>,
    }

    Ok(serde_json::to_string_pretty(&JsonReport { score, decision })?)
}
