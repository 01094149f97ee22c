use healthguard_core::DiagnosisResult;
use serde_json::Value;
use thiserror::Error;

const INVALID_FORMAT: &str = "Format JSON tidak valid";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    /// The sanitized text is not JSON. Carries the parser message.
    #[error("Gagal mengurai diagnosis: {0}")]
    Parse(String),
    /// Valid JSON, but not shaped like a diagnosis reply. The message never
    /// quotes the reply.
    #[error("Gagal mengurai diagnosis: {0}")]
    Schema(String),
}

/// Cut the JSON payload out of a model reply.
///
/// Keeps everything from the first `{` to the last `}` after it, then drops a
/// leading json code-fence marker and a trailing fence. There is
/// no bracket matching: two separate objects in one reply come back as a single
/// span that will not parse.
pub fn sanitize_response(raw: &str) -> &str {
    let span = match raw.find('{') {
        Some(start) => {
            let rest = &raw[start..];
            match rest.rfind('}') {
                Some(end) => &rest[..=end],
                None => "",
            }
        }
        None => "",
    };

    let unfenced = span
        .strip_prefix("```json")
        .map(str::trim_start)
        .unwrap_or(span);
    let unfenced = unfenced
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(unfenced);

    unfenced.trim()
}

/// Parse a raw model reply into a [`DiagnosisResult`].
///
/// Only the outer shape is enforced: the reply must be an object with a
/// non-null `diagnosis` object. Text fields inside it accept any scalar and may
/// be missing; only a list field holding a non-list is rejected.
pub fn parse_diagnosis(raw: &str) -> Result<DiagnosisResult, ResponseError> {
    let cleaned = sanitize_response(raw);

    let value: Value = serde_json::from_str(cleaned).map_err(|e| {
        tracing::warn!(
            raw_len = raw.len(),
            category = ?e.classify(),
            line = e.line(),
            column = e.column(),
            "model reply is not valid JSON"
        );
        ResponseError::Parse(e.to_string())
    })?;

    let diagnosis = match value {
        Value::Object(mut map) => map.remove("diagnosis"),
        _ => None,
    };

    match diagnosis {
        // serde_json quotes the offending value in type errors, so only the
        // category is kept.
        Some(d @ Value::Object(_)) => serde_json::from_value(d).map_err(|e| {
            tracing::warn!(category = ?e.classify(), "diagnosis object has mistyped fields");
            ResponseError::Schema(INVALID_FORMAT.to_string())
        }),
        _ => {
            tracing::warn!("model reply has no diagnosis object");
            Err(ResponseError::Schema(INVALID_FORMAT.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthguard_core::Urgency;

    const FULL: &str = r#"{"diagnosis":{
        "possibleConditions":[
            {"name":"Influenza","probability":"Tinggi","description":"Infeksi virus"}
        ],
        "recommendations":{
            "immediate":["Istirahat"],
            "lifestyle":["Minum air"],
            "medications":["Parasetamol 500mg"]
        },
        "urgencyLevel":"Normal",
        "seekMedicalAttention":"Jika demam lebih dari 3 hari",
        "preventiveMeasures":["Cuci tangan"]
    }}"#;

    #[test]
    fn clean_json_matches_direct_deserialization() {
        let parsed = parse_diagnosis(FULL).unwrap();

        let v: Value = serde_json::from_str(FULL).unwrap();
        let direct: DiagnosisResult = serde_json::from_value(v["diagnosis"].clone()).unwrap();
        assert_eq!(parsed, direct);

        assert_eq!(parsed.urgency_level.as_deref(), Some("Normal"));
        let conditions = parsed.possible_conditions.unwrap();
        assert_eq!(conditions[0].name.as_deref(), Some("Influenza"));
        let recs = parsed.recommendations.unwrap();
        assert_eq!(recs.medications.unwrap(), vec!["Parasetamol 500mg"]);
    }

    #[test]
    fn clean_json_is_left_untouched_by_sanitizer() {
        let clean = r#"{"diagnosis":{"urgencyLevel":"Normal"}}"#;
        assert_eq!(sanitize_response(clean), clean);
    }

    #[test]
    fn fenced_block_is_accepted() {
        let raw = "```json\n{\"diagnosis\":{\"urgencyLevel\":\"Darurat\"}}\n```";
        let d = parse_diagnosis(raw).unwrap();
        assert_eq!(d.urgency_level.as_deref(), Some("Darurat"));
        assert_eq!(d.urgency(), Urgency::Emergency);
    }

    #[test]
    fn leading_prose_is_stripped() {
        let raw = "Here is the result: {\"diagnosis\":{\"urgencyLevel\":\"Segera\"}}";
        let d = parse_diagnosis(raw).unwrap();
        assert_eq!(d.urgency_level.as_deref(), Some("Segera"));
    }

    #[test]
    fn trailing_prose_is_stripped() {
        let raw = "{\"diagnosis\":{\"urgencyLevel\":\"Normal\"}}\n\nSemoga lekas sembuh!";
        assert_eq!(
            sanitize_response(raw),
            "{\"diagnosis\":{\"urgencyLevel\":\"Normal\"}}"
        );
    }

    #[test]
    fn missing_diagnosis_key_is_schema_error() {
        let err = parse_diagnosis(r#"{"foo": 1}"#).unwrap_err();
        assert_eq!(err, ResponseError::Schema("Format JSON tidak valid".into()));
        assert_eq!(err.to_string(), "Gagal mengurai diagnosis: Format JSON tidak valid");
    }

    #[test]
    fn null_or_scalar_diagnosis_is_schema_error() {
        for raw in [
            r#"{"diagnosis": null}"#,
            r#"{"diagnosis": "flu"}"#,
            r#"{"diagnosis": []}"#,
        ] {
            assert!(
                matches!(parse_diagnosis(raw), Err(ResponseError::Schema(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn list_field_given_as_text_is_schema_error() {
        let raw = r#"{"diagnosis":{"preventiveMeasures":"cuci tangan"}}"#;
        assert_eq!(
            parse_diagnosis(raw).unwrap_err(),
            ResponseError::Schema("Format JSON tidak valid".into())
        );
    }

    #[test]
    fn schema_error_does_not_quote_reply_text() {
        let raw = r#"{"diagnosis":{"preventiveMeasures":"pasien HIV positif, hindari kontak"}}"#;
        let err = parse_diagnosis(raw).unwrap_err();
        assert!(matches!(err, ResponseError::Schema(_)));
        assert!(!err.to_string().contains("HIV"));
        assert!(!format!("{err:?}").contains("hindari kontak"));
    }

    #[test]
    fn numeric_scalars_are_accepted() {
        let raw = r#"{"diagnosis":{
            "possibleConditions":[
                {"name":"Influenza","probability":0.8,"description":"Infeksi virus"}
            ],
            "urgencyLevel":"Normal",
            "seekMedicalAttention":3
        }}"#;
        let d = parse_diagnosis(raw).unwrap();
        let c = &d.possible_conditions.as_ref().unwrap()[0];
        assert_eq!(c.probability.as_deref(), Some("0.8"));
        assert_eq!(d.seek_medical_attention.as_deref(), Some("3"));
        assert_eq!(d.urgency(), Urgency::Normal);
    }

    #[test]
    fn missing_nested_fields_are_tolerated() {
        let d = parse_diagnosis(r#"{"diagnosis":{}}"#).unwrap();
        assert_eq!(d, DiagnosisResult::default());
    }

    #[test]
    fn prose_without_braces_is_parse_error() {
        assert!(matches!(
            parse_diagnosis("not json at all"),
            Err(ResponseError::Parse(_))
        ));
        assert_eq!(sanitize_response("not json at all"), "");
    }

    #[test]
    fn closing_brace_before_opening_brace_yields_empty_span() {
        assert_eq!(sanitize_response("} oops {"), "");
        assert!(matches!(
            parse_diagnosis("} oops {"),
            Err(ResponseError::Parse(_))
        ));
    }

    #[test]
    fn malformed_json_reports_parser_message() {
        let err = parse_diagnosis(r#"{"diagnosis": {"urgencyLevel": }}"#).unwrap_err();
        match err {
            ResponseError::Parse(msg) => assert!(!msg.is_empty()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    // The span runs from the first '{' to the last '}', so two objects in one
    // reply are glued together and fail to parse.
    #[test]
    fn multiple_blocks_are_not_disambiguated() {
        let raw = "Contoh: {\"a\": 1}\nJawaban: {\"diagnosis\":{\"urgencyLevel\":\"Normal\"}}";
        assert_eq!(
            sanitize_response(raw),
            "{\"a\": 1}\nJawaban: {\"diagnosis\":{\"urgencyLevel\":\"Normal\"}}"
        );
        assert!(matches!(parse_diagnosis(raw), Err(ResponseError::Parse(_))));
    }

    #[test]
    fn stray_trailing_brace_is_swallowed() {
        let raw = "{\"diagnosis\":{\"urgencyLevel\":\"Normal\"}} :-}";
        assert!(matches!(parse_diagnosis(raw), Err(ResponseError::Parse(_))));
    }
}
