//! DeepSeek chat-completions client for structured case extraction.
//!
//! The model is asked for a strict JSON object matching the semantic case
//! schema; the response body is deserialized directly into
//! [`caseline_core::CaseReport`]. Line-of-therapy reasoning lives entirely in
//! the prompt; this client does no clinical inference of its own.

use crate::error::{Error, Result};
use caseline_core::CaseReport;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::info;

const API_URL: &str = "https://api.deepseek.com/chat/completions";
const DEFAULT_MODEL: &str = "deepseek-chat";

/// Extraction instructions, including the line-of-therapy rules and the
/// output schema. The 12-event timeline cap here matches the layout engine's
/// default cap; the engine still enforces its own regardless.
const SYSTEM_PROMPT: &str = r#"你是一位极其严谨的肿瘤内科主任医师，正在准备一场高水平的学术会议病例汇报。

【核心任务】不仅要提取病史，更要进行深度临床总结与思考。

【治疗线数判定】
- 非手术患者：初始治疗属于一线治疗，严禁标记为辅助。
- 未PD（进展）时的维持治疗或加药调整属于同一线；明确PD后换方案才算下一线。
- 必须完整保留放疗、介入及具体用药方案原文。

【深度总结】
- 计算总生存期（OS），评价治疗效果（如"长期带瘤生存"）。
- 总结治疗策略亮点，捕捉临床矛盾点（如"标志物飙升但影像学SD"）并提出可探讨的问题。

必须严格输出为以下 JSON 格式：
{
    "cover": {"title": "晚期XXX癌综合治疗病例汇报"},
    "baseline": {
        "patient_info": "患者姓名(姓氏)、性别、年龄",
        "chief_complaint": "主诉",
        "diagnosis": "完整的临床及病理诊断",
        "key_exams": "关键基线检查"
    },
    "treatments": [
        {"phase": "阶段（如：一线治疗）", "duration": "具体时间段",
         "regimen": "完整保留该阶段方案及局部治疗", "imaging": "影像学评估",
         "markers": "标志物变化"}
    ],
    "current_admission": {
        "exams": ["检验指标1"], "imaging": "本次影像结论", "plan": ["计划1"]
    },
    "timeline_events": [
        {"date": "年月", "phase": "线数（如'一线'、'二线维持'、'评估'）",
         "event_type": "Treatment 或 Evaluation", "event": "事件简述(限15字)"}
    ],
    "summary": {"highlights": ["亮点1"], "discussion": ["思考1"]}
}
注意：timeline_events 最多提取12个重要节点。"#;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

#[derive(Clone)]
pub struct ExtractionClient {
    http: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl ExtractionClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Reads `DEEPSEEK_API_KEY` from the environment.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("DEEPSEEK_API_KEY").map_err(|_| Error::MissingCredential {
            name: "DEEPSEEK_API_KEY",
        })?;
        Ok(Self::new(api_key))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Turns a free-text clinical narrative into the structured case model.
    pub fn extract(&self, narrative: &str) -> Result<CaseReport> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: narrative,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };
        info!(model = %self.model, chars = narrative.chars().count(), "requesting case extraction");
        let response = self
            .http
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::Api {
                message: format!("extraction request failed with {status}: {body}"),
            });
        }
        let completion: ChatResponse = response.json()?;
        case_from_completion(completion)
    }
}

fn case_from_completion(completion: ChatResponse) -> Result<CaseReport> {
    let first = completion.choices.into_iter().next().ok_or(Error::EmptyCompletion)?;
    Ok(serde_json::from_str(&first.message.content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_completion_into_a_case_report() {
        let body = json!({
            "cover": {"title": "病例汇报"},
            "timeline_events": [
                {"date": "2021-03", "event_type": "Treatment", "event": "AG方案启动"}
            ]
        })
        .to_string();
        let completion: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": body}}]
        }))
        .unwrap();
        let report = case_from_completion(completion).unwrap();
        assert_eq!(report.cover.title, "病例汇报");
        assert_eq!(report.timeline_events.len(), 1);
    }

    #[test]
    fn empty_choice_list_is_an_error() {
        let completion: ChatResponse =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(
            case_from_completion(completion).unwrap_err(),
            Error::EmptyCompletion
        ));
    }

    #[test]
    fn non_json_completion_content_is_an_error() {
        let completion: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "抱歉，我无法解析。"}}]
        }))
        .unwrap();
        assert!(matches!(
            case_from_completion(completion).unwrap_err(),
            Error::Json(_)
        ));
    }

    #[test]
    fn system_prompt_pins_the_schema_and_cap() {
        assert!(SYSTEM_PROMPT.contains("timeline_events"));
        assert!(SYSTEM_PROMPT.contains("12"));
        assert!(SYSTEM_PROMPT.contains("json") || SYSTEM_PROMPT.contains("JSON"));
    }
}
