//! Whole-deck assembly: one SVG document per slide.

use crate::svg::SvgDoc;
use crate::text::{DeterministicTextMeasurer, TextMeasurer, TextStyle, wrap_lines};
use crate::timeline::paint_timeline;
use crate::Result;
use caseline_core::{CaseReport, Color, Palette, TimelineLayoutOptions, layout_timeline};
use std::sync::Arc;

const HEADER_HEIGHT: f64 = 0.9;
const CONTENT_X: f64 = 0.8;
const CONTENT_WIDTH: f64 = 11.5;
const CONTENT_TOP: f64 = 1.2;

/// Admission content beyond these sizes is split across two slides.
const ADMISSION_PLAN_SPLIT_CHARS: usize = 200;
const ADMISSION_TOTAL_SPLIT_CHARS: usize = 500;

#[derive(Debug, Clone, serde::Serialize)]
pub struct Slide {
    pub title: String,
    pub svg: String,
}

#[derive(Clone)]
pub struct DeckOptions {
    /// Slide size in inches (16:9 deck).
    pub slide_width: f64,
    pub slide_height: f64,
    /// Usable axis span handed to the timeline layout engine.
    pub timeline_span: f64,
    pub timeline: TimelineLayoutOptions,
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl Default for DeckOptions {
    fn default() -> Self {
        Self {
            slide_width: 13.333,
            slide_height: 7.5,
            timeline_span: 12.1,
            timeline: TimelineLayoutOptions::default(),
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        }
    }
}

impl DeckOptions {
    fn palette(&self) -> &Palette {
        &self.timeline.palette
    }
}

/// Renders the full deck: cover, baseline, one slide per treatment phase,
/// current admission (split when long), timeline, summary. Slides whose
/// source sections are empty are skipped rather than rendered blank.
pub fn render_deck(report: &CaseReport, options: &DeckOptions) -> Result<Vec<Slide>> {
    let mut slides = Vec::new();
    slides.push(cover_slide(report, options));
    slides.push(baseline_slide(report, options));
    treatment_slides(report, options, &mut slides);
    admission_slides(report, options, &mut slides);
    if let Some(slide) = timeline_slide(report, options)? {
        slides.push(slide);
    }
    if let Some(slide) = summary_slide(report, options) {
        slides.push(slide);
    }
    Ok(slides)
}

fn new_slide_doc(options: &DeckOptions) -> SvgDoc {
    let mut doc = SvgDoc::new(options.slide_width, options.slide_height);
    doc.rect(
        0.0,
        0.0,
        options.slide_width,
        options.slide_height,
        options.palette().white,
    );
    doc
}

fn add_header(doc: &mut SvgDoc, options: &DeckOptions, title: &str) {
    let palette = options.palette();
    doc.rect(0.0, 0.0, options.slide_width, HEADER_HEIGHT, palette.primary);
    let style = TextStyle::bold(28.0);
    doc.text(
        0.5,
        HEADER_HEIGHT / 2.0 + style.font_size_in() * 0.35,
        title,
        style.font_size_in(),
        palette.white,
        true,
        "start",
    );
}

/// Emits a wrapped left-aligned paragraph; returns the y just below it.
fn paragraph(
    doc: &mut SvgDoc,
    options: &DeckOptions,
    x: f64,
    mut y: f64,
    width: f64,
    text: &str,
    style: &TextStyle,
    color: Color,
) -> f64 {
    let line_h = style.font_size_in() * 1.35;
    for line in wrap_lines(text, width, style, options.text_measurer.as_ref()) {
        y += line_h;
        doc.text(x, y, &line, style.font_size_in(), color, style.bold, "start");
    }
    y
}

fn cover_slide(report: &CaseReport, options: &DeckOptions) -> Slide {
    let palette = options.palette();
    let mut doc = SvgDoc::new(options.slide_width, options.slide_height);
    doc.rect(
        0.0,
        0.0,
        options.slide_width,
        options.slide_height,
        palette.primary,
    );
    let title = if report.cover.title.trim().is_empty() {
        "病例汇报"
    } else {
        report.cover.title.trim()
    };
    let style = TextStyle::bold(48.0);
    doc.text(
        options.slide_width / 2.0,
        options.slide_height / 2.0 + style.font_size_in() * 0.35,
        title,
        style.font_size_in(),
        palette.white,
        true,
        "middle",
    );
    Slide {
        title: title.to_string(),
        svg: doc.finish(),
    }
}

fn baseline_slide(report: &CaseReport, options: &DeckOptions) -> Slide {
    let palette = options.palette();
    let mut doc = new_slide_doc(options);
    add_header(&mut doc, options, "病例介绍 (基线资料)");

    let style = TextStyle::new(20.0);
    let mut y = CONTENT_TOP;
    let sections = [
        ("【患者信息】", report.baseline.patient_info.as_str()),
        ("【主诉】", report.baseline.chief_complaint.as_str()),
        ("【临床诊断】", report.baseline.diagnosis.as_str()),
        ("【关键检查/病理】", report.baseline.key_exams.as_str()),
    ];
    for (label, body) in sections {
        let text = format!("{label} {body}");
        y = paragraph(
            &mut doc,
            options,
            CONTENT_X,
            y,
            CONTENT_WIDTH,
            &text,
            &style,
            palette.card_text,
        );
        y += style.font_size_in() * 0.8;
    }
    Slide {
        title: "病例介绍 (基线资料)".to_string(),
        svg: doc.finish(),
    }
}

fn treatment_slides(report: &CaseReport, options: &DeckOptions, slides: &mut Vec<Slide>) {
    let palette = options.palette();
    for tx in &report.treatments {
        // Adjuvant stubs with an essentially empty regimen carry no content
        // worth a slide.
        if tx.phase.contains("辅助") && tx.regimen.chars().count() < 5 {
            continue;
        }
        let phase_name = if tx.phase.trim().is_empty() {
            "阶段治疗"
        } else {
            tx.phase.trim()
        };
        let title = format!("治疗经过：{phase_name}");
        let mut doc = new_slide_doc(options);
        add_header(&mut doc, options, &title);

        let mut y = CONTENT_TOP;
        y = paragraph(
            &mut doc,
            options,
            CONTENT_X,
            y,
            CONTENT_WIDTH,
            &format!("【治疗时间】 {}", tx.duration),
            &TextStyle::bold(20.0),
            palette.primary,
        );
        y += 0.2;
        y = paragraph(
            &mut doc,
            options,
            CONTENT_X,
            y,
            CONTENT_WIDTH,
            &format!("【用药方案及局部治疗】{}", tx.regimen),
            &TextStyle::new(16.0),
            palette.card_text,
        );
        y += 0.2;
        y = paragraph(
            &mut doc,
            options,
            CONTENT_X,
            y,
            CONTENT_WIDTH,
            &format!("【影像学评估】{}", tx.imaging),
            &TextStyle::new(16.0),
            Color::rgb(50, 50, 50),
        );
        y += 0.2;
        paragraph(
            &mut doc,
            options,
            CONTENT_X,
            y,
            CONTENT_WIDTH,
            &format!("【肿瘤标志物】{}", tx.markers),
            &TextStyle::new(16.0),
            palette.accent,
        );
        slides.push(Slide {
            title,
            svg: doc.finish(),
        });
    }
}

fn bulleted(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn admission_slides(report: &CaseReport, options: &DeckOptions, slides: &mut Vec<Slide>) {
    let Some(adm) = &report.current_admission else {
        return;
    };
    let palette = options.palette();
    let exams = bulleted(&adm.exams);
    let plan = bulleted(&adm.plan);
    let total_chars =
        exams.chars().count() + adm.imaging.chars().count() + plan.chars().count();
    let split =
        plan.chars().count() > ADMISSION_PLAN_SPLIT_CHARS || total_chars > ADMISSION_TOTAL_SPLIT_CHARS;

    let label_style = TextStyle::bold(20.0);
    let body_style = TextStyle::new(18.0);

    if split {
        let title1 = "本次入院评估 (1/2)";
        let mut doc = new_slide_doc(options);
        add_header(&mut doc, options, title1);
        let mut y = CONTENT_TOP;
        for (label, body) in [("【入院检验指标】", exams.as_str()), ("【影像学评估】", adm.imaging.as_str())] {
            y = paragraph(&mut doc, options, CONTENT_X, y, CONTENT_WIDTH, label, &label_style, palette.primary);
            y = paragraph(&mut doc, options, CONTENT_X, y, CONTENT_WIDTH, body, &body_style, palette.card_text);
            y += 0.25;
        }
        slides.push(Slide {
            title: title1.to_string(),
            svg: doc.finish(),
        });

        let title2 = "后续治疗与随访计划 (2/2)";
        let mut doc = new_slide_doc(options);
        add_header(&mut doc, options, title2);
        let mut y = CONTENT_TOP;
        y = paragraph(&mut doc, options, CONTENT_X, y, CONTENT_WIDTH, "【治疗与随访计划】", &label_style, palette.primary);
        paragraph(&mut doc, options, CONTENT_X, y, CONTENT_WIDTH, &plan, &body_style, palette.card_text);
        slides.push(Slide {
            title: title2.to_string(),
            svg: doc.finish(),
        });
    } else {
        let title = "本次入院评估及计划 (转归)";
        let mut doc = new_slide_doc(options);
        add_header(&mut doc, options, title);
        let style = TextStyle::new(16.0);
        let content = format!(
            "【入院检验指标】\n{exams}\n\n【影像学评估】\n{}\n\n【后续计划】\n{plan}",
            adm.imaging
        );
        paragraph(&mut doc, options, CONTENT_X, CONTENT_TOP, CONTENT_WIDTH, &content, &style, palette.card_text);
        slides.push(Slide {
            title: title.to_string(),
            svg: doc.finish(),
        });
    }
}

fn timeline_slide(report: &CaseReport, options: &DeckOptions) -> Result<Option<Slide>> {
    if report.timeline_events.is_empty() {
        return Ok(None);
    }
    let layout = layout_timeline(
        &report.timeline_events,
        options.timeline_span,
        &options.timeline,
    )?;
    let title = "全病程时间轴概览 (Timeline)";
    let mut doc = new_slide_doc(options);
    add_header(&mut doc, options, title);
    paint_timeline(
        &mut doc,
        &layout,
        options.palette(),
        options.text_measurer.as_ref(),
    );
    Ok(Some(Slide {
        title: title.to_string(),
        svg: doc.finish(),
    }))
}

fn summary_slide(report: &CaseReport, options: &DeckOptions) -> Option<Slide> {
    let summary = &report.summary;
    if summary.highlights.is_empty() && summary.discussion.is_empty() {
        return None;
    }
    let palette = options.palette();
    let title = "病例思考与总结";
    let mut doc = new_slide_doc(options);
    add_header(&mut doc, options, title);

    let mut y = 1.3;
    for item in &summary.highlights {
        y = paragraph(
            &mut doc,
            options,
            CONTENT_X,
            y,
            CONTENT_WIDTH,
            &format!("• {item}"),
            &TextStyle::bold(22.0),
            palette.card_text,
        );
        y += 0.15;
    }

    if !summary.discussion.is_empty() {
        // Brand divider between highlights and discussion.
        doc.rect(CONTENT_X, 4.3, CONTENT_WIDTH, 0.03, palette.primary);
        let mut y = 4.5;
        y = paragraph(
            &mut doc,
            options,
            CONTENT_X,
            y,
            CONTENT_WIDTH,
            "思考：",
            &TextStyle::bold(22.0),
            palette.card_text,
        );
        for item in &summary.discussion {
            y = paragraph(
                &mut doc,
                options,
                CONTENT_X,
                y,
                CONTENT_WIDTH,
                &format!("➤ {item}"),
                &TextStyle::bold(20.0),
                palette.card_text,
            );
            y += 0.1;
        }
    }
    Some(Slide {
        title: title.to_string(),
        svg: doc.finish(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_report() -> CaseReport {
        serde_json::from_value(json!({
            "cover": {"title": "晚期胰腺癌综合治疗病例汇报"},
            "baseline": {"patient_info": "王某，男，71岁", "diagnosis": "胰腺癌 IV期"},
            "treatments": [
                {"phase": "一线治疗", "duration": "2021-03 至 2021-12", "regimen": "AG方案"},
                {"phase": "辅助", "regimen": "无"}
            ],
            "current_admission": {"exams": ["CA19-9 2100"], "imaging": "SD", "plan": ["维持"]},
            "timeline_events": [
                {"date": "2021-03", "phase": "一线", "event_type": "Treatment", "event": "AG启动"},
                {"date": "2021-09", "phase": "评估", "event_type": "Evaluation", "event": "影像学SD"}
            ],
            "summary": {"highlights": ["长期带瘤生存"], "discussion": ["是否换线？"]}
        }))
        .unwrap()
    }

    #[test]
    fn deck_has_expected_slides_in_order() {
        let slides = render_deck(&sample_report(), &DeckOptions::default()).unwrap();
        let titles: Vec<&str> = slides.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "晚期胰腺癌综合治疗病例汇报",
                "病例介绍 (基线资料)",
                "治疗经过：一线治疗",
                "本次入院评估及计划 (转归)",
                "全病程时间轴概览 (Timeline)",
                "病例思考与总结",
            ]
        );
    }

    #[test]
    fn empty_adjuvant_stub_is_skipped() {
        let slides = render_deck(&sample_report(), &DeckOptions::default()).unwrap();
        assert!(!slides.iter().any(|s| s.title == "治疗经过：辅助"));
    }

    #[test]
    fn long_admission_content_splits_into_two_slides() {
        let mut report = sample_report();
        if let Some(adm) = &mut report.current_admission {
            adm.plan = vec!["随访计划".repeat(60)];
        }
        let slides = render_deck(&report, &DeckOptions::default()).unwrap();
        let titles: Vec<&str> = slides.iter().map(|s| s.title.as_str()).collect();
        assert!(titles.contains(&"本次入院评估 (1/2)"));
        assert!(titles.contains(&"后续治疗与随访计划 (2/2)"));
    }

    #[test]
    fn empty_report_still_renders_cover_and_baseline() {
        let report = CaseReport::default();
        let slides = render_deck(&report, &DeckOptions::default()).unwrap();
        let titles: Vec<&str> = slides.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["病例汇报", "病例介绍 (基线资料)"]);
    }

    #[test]
    fn timeline_slide_contains_every_event_date() {
        let slides = render_deck(&sample_report(), &DeckOptions::default()).unwrap();
        let timeline = slides
            .iter()
            .find(|s| s.title.contains("Timeline"))
            .unwrap();
        assert!(timeline.svg.contains("2021-03"));
        assert!(timeline.svg.contains("2021-09"));
    }
}
