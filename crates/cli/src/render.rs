//! Human-readable rendering of walkthrough snapshots.
//!
//! Templates receive the snapshot's JSON form, so a trace field that has not been computed
//! yet is simply undefined and its section is skipped.

use std::collections::HashMap;

use serde::Serialize;
use stepwise_core::dataset::ProductRecord;
use stepwise_core::{RecommendationTrace, ReviewTrace, Snapshot};
use tera::{Context, Tera};

pub const DEFAULT_SCORE_PRECISION: usize = 4;

const RECOMMENDATION_TEMPLATE: &str = r#"{% if active -%}
[{{ kind }} {{ current_step }}/{{ max_steps }}] {{ stage }}
{%- if trace.selected_product is defined %}
  product: {{ trace.selected_product }} ({{ trace.total_purchases }} purchases)
{%- endif %}
{%- if trace.co_items is defined %}
  co-purchases: {% for row in trace.co_items %}{{ row.item }} x{{ row.count }}{% if not loop.last %}, {% endif %}{% endfor %}{% if trace.co_items | length == 0 %}none{% endif %}
{%- endif %}
{%- if trace.similarities is defined %}
  similarity:
{%- for entry in trace.similarities %}
    {{ entry.item }}: {{ entry.count }}/{{ entry.total }} = {{ entry.score | score(precision=precision) }}
{%- endfor %}
{%- endif %}
{%- if trace.ranked is defined %}
  ranked: {% for entry in trace.ranked %}{{ loop.index }}. {{ entry.item }}{% if not loop.last %}, {% endif %}{% endfor %}
{%- endif %}
{%- if trace.top_recommendations is defined %}
  recommend: {% for entry in trace.top_recommendations %}{{ entry.item }} ({{ entry.score | score(precision=precision) }}){% if not loop.last %}, {% endif %}{% endfor %}{% if trace.top_recommendations | length == 0 %}nothing to recommend{% endif %}
{%- endif %}
{%- else -%}
[{{ kind }}] not started
{%- endif %}"#;

const REVIEW_TEMPLATE: &str = r#"{% if active -%}
[{{ kind }} {{ current_step }}/{{ max_steps }}] {{ stage }}
{%- if trace.original_text is defined %}
  text: "{{ trace.original_text }}" ({{ trace.length }} chars)
{%- endif %}
{%- if trace.lowercased is defined %}
  lowercased: "{{ trace.lowercased }}"
{%- endif %}
{%- if trace.depunctuated is defined %}
  depunctuated: "{{ trace.depunctuated }}"
{%- endif %}
{%- if trace.filtered_tokens is defined %}
  kept: {{ trace.filtered_tokens | join(sep=", ") }}
  removed stopwords: {{ trace.removed_stopwords | join(sep=", ") }}
{%- endif %}
{%- if trace.tokens is defined %}
  tokens ({{ trace.tokens | length }}): {{ trace.tokens | join(sep=" | ") }}
{%- endif %}
{%- if trace.sentiment_score is defined %}
  sentiment: {{ trace.sentiment_score }}
  positive words: {{ trace.positive_words | join(sep=", ") }}
  negative words: {{ trace.negative_words | join(sep=", ") }}
{%- endif %}
{%- if trace.detected_aspects is defined %}
  aspects:{% if trace.detected_aspects | length == 0 %} none{% endif %}
{%- for found in trace.detected_aspects %}
    {{ found.aspect }}: {{ found.keywords | join(sep=", ") }}
{%- endfor %}
{%- endif %}
{%- if trace.insight is defined %}
  classification: {{ trace.classification }}
  insight: {{ trace.insight }}
{%- endif %}
{%- else -%}
[{{ kind }}] not started
{%- endif %}"#;

const PRODUCTS_TEMPLATE: &str = r#"{{ products | length }} products
{%- for product in products %}
  {{ product.name }}: {{ product.total_purchases }} purchases, {{ product.co_purchases | length }} co-purchased items
{%- endfor %}"#;

/// Register custom Tera filters used by snapshot templates.
///
/// - `score`: fixed-precision similarity score, e.g. `entry.score | score(precision=4)`
pub fn register_template_filters(tera: &mut Tera) {
    tera.register_filter("score", tera_score_filter);
}

fn tera_score_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let score = value.as_f64().ok_or_else(|| tera::Error::msg("score filter expects a number"))?;

    let precision = match args.get("precision") {
        Some(tera::Value::Number(n)) => {
            n.as_u64().and_then(|p| usize::try_from(p).ok()).unwrap_or(DEFAULT_SCORE_PRECISION)
        }
        _ => DEFAULT_SCORE_PRECISION,
    };

    Ok(tera::Value::String(format!("{score:.precision$}")))
}

pub struct Renderer {
    tera: Tera,
    precision: usize,
}

impl Renderer {
    pub fn new(precision: usize) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        register_template_filters(&mut tera);
        tera.add_raw_templates(vec![
            ("recommendation.txt", RECOMMENDATION_TEMPLATE),
            ("review.txt", REVIEW_TEMPLATE),
            ("products.txt", PRODUCTS_TEMPLATE),
        ])?;

        Ok(Self { tera, precision })
    }

    pub fn recommendation(
        &self,
        snapshot: &Snapshot<RecommendationTrace>,
    ) -> Result<String, tera::Error> {
        self.render_snapshot("recommendation.txt", snapshot)
    }

    pub fn review(&self, snapshot: &Snapshot<ReviewTrace>) -> Result<String, tera::Error> {
        self.render_snapshot("review.txt", snapshot)
    }

    pub fn products(&self, products: &[ProductRecord]) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("products", products);
        self.render("products.txt", &context)
    }

    fn render_snapshot<T: Serialize>(
        &self,
        template: &str,
        snapshot: &Snapshot<T>,
    ) -> Result<String, tera::Error> {
        let mut context = Context::from_serialize(snapshot)?;
        context.insert("precision", &self.precision);
        self.render(template, &context)
    }

    fn render(&self, template: &str, context: &Context) -> Result<String, tera::Error> {
        Ok(self.tera.render(template, context)?.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use stepwise_core::{RecommendationEngine, ReviewEngine};

    use super::{tera_score_filter, Renderer};

    #[test]
    fn score_filter_applies_precision_argument() {
        let mut args = HashMap::new();
        args.insert("precision".to_string(), tera::Value::from(2));

        let value = tera_score_filter(&tera::Value::from(45.0 / 165.0), &args)
            .expect("score filter should format numbers");
        assert_eq!(value, tera::Value::String("0.27".to_string()));

        let defaulted = tera_score_filter(&tera::Value::from(0.5), &HashMap::new())
            .expect("score filter should default precision");
        assert_eq!(defaulted, tera::Value::String("0.5000".to_string()));
    }

    #[test]
    fn score_filter_rejects_non_numbers() {
        let result = tera_score_filter(&tera::Value::from("Mouse"), &HashMap::new());
        assert!(result.is_err());
    }

    #[test]
    fn recommendation_sections_appear_as_steps_complete() {
        let renderer = Renderer::new(4).expect("templates should compile");
        let mut engine = RecommendationEngine::default();

        let first = renderer
            .recommendation(&engine.initialize("Laptop").expect("initialize"))
            .expect("render step 1");
        assert!(first.starts_with("[recommendation 1/6] Select product"));
        assert!(first.contains("product: Laptop (165 purchases)"));
        assert!(!first.contains("similarity:"));

        let snapshots = engine.walk("Laptop", 6).expect("walk");
        let last = renderer
            .recommendation(snapshots.last().expect("final snapshot"))
            .expect("render step 6");
        assert!(last.contains("Mouse: 45/165 = 0.2727"));
        assert!(last.contains("recommend: Mouse (0.2727), Keyboard (0.2242)"));
    }

    #[test]
    fn inactive_snapshot_renders_placeholder() {
        let renderer = Renderer::new(4).expect("templates should compile");
        let rendered =
            renderer.review(&ReviewEngine::default().snapshot()).expect("render inactive");
        assert_eq!(rendered, "[review] not started");
    }

    #[test]
    fn review_insight_is_rendered_on_final_step() {
        let renderer = Renderer::new(4).expect("templates should compile");
        let mut engine = ReviewEngine::default();
        let snapshots =
            engine.walk("The product quality is EXCELLENT! Fast delivery.", 8).expect("walk");

        let rendered =
            renderer.review(snapshots.last().expect("final snapshot")).expect("render step 8");
        assert!(rendered.contains("removed stopwords: the, is"));
        assert!(rendered.contains("sentiment: 2"));
        assert!(rendered.contains("Quality: quality"));
        assert!(rendered.contains("insight: Customers appreciate delivery."));
    }
}
