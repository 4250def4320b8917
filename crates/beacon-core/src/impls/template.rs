//! ContextTemplateRenderer - `{{ name }}` を TaskContext の変数で置換する
//!
//! Jinja のサブセット: 変数参照のみ（フィルタ・制御構文なし）。
//! 未定義の変数はエラー（strict undefined）。
//! 変数名以外の式や閉じていない `{{` もエラーにして、未展開のまま送らない。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{BeaconError, TaskContext};
use crate::ports::TemplateRenderer;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}").expect("placeholder regex"));

static VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").expect("variable regex"));

#[derive(Debug, Default, Clone, Copy)]
pub struct ContextTemplateRenderer;

impl ContextTemplateRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for ContextTemplateRenderer {
    fn render(&self, field: &str, template: &str, ctx: &TaskContext) -> Result<String, BeaconError> {
        if !template.contains("{{") {
            return Ok(template.to_string());
        }

        let vars = ctx.template_vars();
        let mut out = String::with_capacity(template.len());
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(template) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            // 変数参照以外（フィルタ・添字など）は受け付けない
            let name = inner.as_str().trim();
            if !VARIABLE.is_match(name) {
                return Err(BeaconError::template(
                    field,
                    format!("unsupported expression '{}'", whole.as_str()),
                ));
            }
            let value = vars
                .get(name)
                .ok_or_else(|| BeaconError::template(field, format!("'{name}' is undefined")))?;
            out.push_str(&template[last..whole.start()]);
            out.push_str(value);
            last = whole.end();
        }

        let rest = &template[last..];
        if rest.contains("{{") {
            return Err(BeaconError::template(field, "unclosed '{{'"));
        }
        out.push_str(rest);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RunId;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;
    use ulid::Ulid;

    fn ctx() -> TaskContext {
        TaskContext::new(
            "daily",
            "track",
            RunId::from_ulid(Ulid::nil()),
            Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap(),
        )
        .with_param("user", json!("u42"))
    }

    #[rstest]
    #[case::plain("signup", "signup")]
    #[case::date("report_{{ ds }}", "report_2024-03-05")]
    #[case::no_spaces("{{ds_nodash}}", "20240305")]
    #[case::param("{{ params.user }}", "u42")]
    #[case::many("{{ dag_id }}.{{ task_id }}", "daily.track")]
    fn renders_placeholders(#[case] template: &str, #[case] expected: &str) {
        let rendered = ContextTemplateRenderer.render("event", template, &ctx()).unwrap();
        assert_eq!(rendered, expected);
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let err = ContextTemplateRenderer
            .render("user_id", "{{ params.missing }}", &ctx())
            .unwrap_err();
        assert!(matches!(err, BeaconError::Template { ref field, .. } if field == "user_id"));
        assert!(err.to_string().contains("params.missing"));
    }

    #[rstest]
    #[case::filter("{{ params.user | upper }}")]
    #[case::subscript("{{ params['user'] }}")]
    #[case::bad_identifier("{{ 1user }}")]
    #[case::empty("{{ }}")]
    #[case::unclosed("x {{ ds")]
    #[case::unclosed_after_placeholder("{{ ds }} {{ ds")]
    fn non_variable_placeholders_are_errors(#[case] template: &str) {
        let err = ContextTemplateRenderer.render("event", template, &ctx()).unwrap_err();
        assert!(matches!(err, BeaconError::Template { ref field, .. } if field == "event"));
    }

    #[test]
    fn rendered_values_are_not_rescanned() {
        let ctx = ctx().with_param("raw", json!("{{ ds"));
        let rendered = ContextTemplateRenderer.render("event", "{{ params.raw }}", &ctx).unwrap();
        assert_eq!(rendered, "{{ ds");
    }
}
