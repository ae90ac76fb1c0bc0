use crate::*;
use serde_json::json;

#[test]
fn parses_the_full_extraction_shape() {
    let value = json!({
        "cover": {"title": "晚期胰腺癌综合治疗病例汇报"},
        "baseline": {
            "patient_info": "王某，男，71岁",
            "chief_complaint": "上腹痛3月",
            "diagnosis": "胰腺导管腺癌 cT3N1M1 IV期",
            "key_exams": "CA19-9 1200 U/mL"
        },
        "treatments": [
            {
                "phase": "一线治疗",
                "duration": "2021-03 至 2021-12",
                "regimen": "AG方案（白蛋白紫杉醇+吉西他滨）",
                "imaging": "PR",
                "markers": "CA19-9 降至 85"
            }
        ],
        "current_admission": {
            "exams": ["CA19-9 2100", "白蛋白 32"],
            "imaging": "肝内多发新发转移灶",
            "plan": ["更换三线方案", "营养支持"]
        },
        "timeline_events": [
            {"date": "2021-03", "phase": "一线", "event_type": "Treatment", "event": "AG方案启动"},
            {"date": "2021-09", "phase": "评估", "event_type": "Evaluation", "event": "影像学PR"}
        ],
        "summary": {
            "highlights": ["高龄患者长期带瘤生存"],
            "discussion": ["标志物升高而影像SD时是否换线？"]
        }
    });
    let report: CaseReport = serde_json::from_value(value).unwrap();
    assert_eq!(report.cover.title, "晚期胰腺癌综合治疗病例汇报");
    assert_eq!(report.treatments.len(), 1);
    assert_eq!(report.timeline_events.len(), 2);
    assert_eq!(report.timeline_events[0].category, EventCategory::Treatment);
    assert_eq!(report.timeline_events[1].category, EventCategory::Evaluation);
    assert_eq!(report.timeline_events[1].description, "影像学PR");
    let admission = report.current_admission.unwrap();
    assert_eq!(admission.exams.len(), 2);
    assert_eq!(report.summary.discussion.len(), 1);
}

#[test]
fn missing_fields_default_to_empty() {
    let report: CaseReport = serde_json::from_value(json!({})).unwrap();
    assert_eq!(report.cover.title, "");
    assert!(report.treatments.is_empty());
    assert!(report.timeline_events.is_empty());
    assert!(report.current_admission.is_none());
}

#[test]
fn legacy_list_summary_becomes_highlights() {
    let report: CaseReport =
        serde_json::from_value(json!({"summary": ["亮点一", "亮点二"]})).unwrap();
    assert_eq!(report.summary.highlights, vec!["亮点一", "亮点二"]);
    assert!(report.summary.discussion.is_empty());
}

#[test]
fn admission_lists_accept_bare_strings() {
    let report: CaseReport = serde_json::from_value(json!({
        "current_admission": {"exams": "CA19-9 2100", "imaging": "SD", "plan": "维持原方案"}
    }))
    .unwrap();
    let admission = report.current_admission.unwrap();
    assert_eq!(admission.exams, vec!["CA19-9 2100"]);
    assert_eq!(admission.plan, vec!["维持原方案"]);
}

#[test]
fn unknown_event_category_falls_back_to_treatment() {
    let report: CaseReport = serde_json::from_value(json!({
        "timeline_events": [{"date": "2021-01", "event_type": "Surgery", "event": "根治术"}]
    }))
    .unwrap();
    assert_eq!(report.timeline_events[0].category, EventCategory::Treatment);
}

#[test]
fn spec_field_names_are_accepted_too() {
    let report: CaseReport = serde_json::from_value(json!({
        "timeline_events": [{"date": "2021-01", "category": "Evaluation", "description": "SD"}]
    }))
    .unwrap();
    assert_eq!(report.timeline_events[0].category, EventCategory::Evaluation);
    assert_eq!(report.timeline_events[0].description, "SD");
}

#[test]
fn adjuvant_phases_are_rewritten_without_surgery() {
    let mut report: CaseReport = serde_json::from_value(json!({
        "treatments": [{"phase": "辅助化疗", "regimen": "XELOX"}],
        "timeline_events": [{"date": "2021-01", "phase": "辅助", "event": "XELOX启动"}]
    }))
    .unwrap();
    report.normalize_phases();
    assert_eq!(report.treatments[0].phase, "一线治疗");
    assert_eq!(report.timeline_events[0].phase.as_deref(), Some("一线"));
}

#[test]
fn adjuvant_phases_survive_when_surgery_is_documented() {
    let mut report: CaseReport = serde_json::from_value(json!({
        "baseline": {"diagnosis": "直肠癌根治术后"},
        "treatments": [{"phase": "辅助化疗", "regimen": "XELOX"}]
    }))
    .unwrap();
    report.normalize_phases();
    assert_eq!(report.treatments[0].phase, "辅助化疗");
}
