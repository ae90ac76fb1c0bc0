use assert_cmd::Command;
use std::fs;

const CASE_JSON: &str = r#"{
  "cover": {"title": "晚期胰腺癌综合治疗病例汇报"},
  "baseline": {"patient_info": "王某，男，71岁", "diagnosis": "胰腺癌 IV期"},
  "treatments": [{"phase": "一线治疗", "duration": "2021-03 至 2021-12", "regimen": "AG方案"}],
  "timeline_events": [
    {"date": "2021-03", "phase": "一线", "event_type": "Treatment", "event": "AG方案启动"},
    {"date": "2021-09", "phase": "评估", "event_type": "Evaluation", "event": "影像学SD"},
    {"date": "2022-01", "phase": "评估", "event_type": "Evaluation", "event": "PD，肝新发病灶"}
  ],
  "summary": {"highlights": ["长期带瘤生存"], "discussion": []}
}"#;

#[test]
fn layout_prints_timeline_geometry() {
    let exe = assert_cmd::cargo_bin!("caseline-cli");
    let output = Command::new(exe)
        .args(["layout", "-"])
        .write_stdin(CASE_JSON)
        .output()
        .expect("run caseline-cli");
    assert!(output.status.success());

    let layout: serde_json::Value = serde_json::from_slice(&output.stdout).expect("layout JSON");
    let nodes = layout["nodes"].as_array().expect("nodes array");
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0]["anchor_x"].as_f64().unwrap(), 0.6);
    assert_eq!(nodes[0]["side"].as_str().unwrap(), "above");
    assert_eq!(nodes[1]["side"].as_str().unwrap(), "below");
    // The PD event classifies as the alert color.
    assert_eq!(nodes[2]["color"], serde_json::json!({"r": 220, "g": 50, "b": 50}));
}

#[test]
fn layout_honors_the_event_cap_flag() {
    let exe = assert_cmd::cargo_bin!("caseline-cli");
    let output = Command::new(exe)
        .args(["layout", "--max-events", "2", "-"])
        .write_stdin(CASE_JSON)
        .output()
        .expect("run caseline-cli");
    assert!(output.status.success());
    let layout: serde_json::Value = serde_json::from_slice(&output.stdout).expect("layout JSON");
    assert_eq!(layout["nodes"].as_array().unwrap().len(), 2);
}

#[test]
fn render_writes_one_svg_per_slide() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out_dir = tmp.path().join("deck");

    let exe = assert_cmd::cargo_bin!("caseline-cli");
    Command::new(exe)
        .args(["render", "--out", out_dir.to_string_lossy().as_ref(), "-"])
        .write_stdin(CASE_JSON)
        .assert()
        .success();

    let mut paths: Vec<_> = fs::read_dir(&out_dir)
        .expect("read deck dir")
        .map(|e| e.expect("dir entry").path())
        .collect();
    paths.sort();
    // Cover, baseline, one treatment, timeline, summary.
    assert_eq!(paths.len(), 5);
    for path in paths {
        let svg = fs::read_to_string(path).expect("read slide");
        assert!(svg.starts_with("<svg "));
        assert!(svg.ends_with("</svg>"));
    }
}

#[test]
fn unknown_flags_exit_with_usage() {
    let exe = assert_cmd::cargo_bin!("caseline-cli");
    Command::new(exe)
        .args(["layout", "--bogus"])
        .assert()
        .code(2);
}
