//! Lexical cues used by the classifier.
//!
//! Keyword lists mix English and Chinese because the desktop client accepts
//! both typed and dictated input.

use crate::model::content::ContentId;
use crate::model::message::Priority;
use once_cell::sync::Lazy;
use regex::Regex;

const URGENT_KEYWORDS: &[&str] = &[
    "urgent",
    "asap",
    "immediately",
    "紧急",
    "立刻",
    "马上",
    "客户",
    "订单",
    "合同",
    "故障",
    "宕机",
    "事故",
];
const NORMAL_KEYWORDS: &[&str] = &[
    "today", "todo", "meeting", "reply", "confirm", "approve", "今天", "待办", "会议", "回复",
    "确认", "审批",
];
/// Words that look like a `Name:` prefix but label the text instead.
const NON_SENDER_LABELS: &[&str] = &[
    "note", "memo", "todo", "reminder", "re", "fyi", "feedback", "content", "article", "http",
    "https", "备忘", "提醒",
];

static MEMO_KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(remind me|remember|memo|note to self)\b|备忘|记住|记录|提醒我")
        .expect("valid memo keyword regex")
});
static SENDER_FROM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*(?:(?:wechat|message|msg)\s+)?from\s+([^:：\n]{1,40}?)\s*[:：]\s*(.+)$")
        .expect("valid sender-from regex")
});
static SENDER_SAID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*([^\s:：，,]{1,20}?)说\s*[:：]?\s*(.+)$").expect("valid sender-said regex")
});
static SENDER_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*([^\s:：#]{1,32})\s*[:：]\s*(.+)$").expect("valid sender prefix regex")
});
static CHANNEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(wechat|message from|msg from)\b|微信|消息").expect("valid channel regex")
});
static CONTENT_REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:#|\b(?:content|article|item|post)\s*#?\s*)(\d{1,18})\b|内容\s*#?\s*(\d{1,18})|第\s*(\d{1,18})\s*[条篇]",
    )
    .expect("valid content reference regex")
});
static EXPLICIT_SCORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(\d)\s*/\s*5\b|\b(?:score|rate|rating|rated)\s*[:=]?\s*(\d)\b|\b(\d)\s*stars?\b|(?:^|\D)(\d{1,2})\s*分",
    )
    .expect("valid score regex")
});
static NEGATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(bad|boring|useless|dislike|hate|irrelevant|spam|not useful|not interested)\b|不喜欢|没用|无聊|垃圾|不感兴趣",
    )
    .expect("valid negative sentiment regex")
});
static POSITIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(great|good|love|like|liked|useful|helpful|excellent|awesome|interesting)\b|喜欢|不错|有用|很好|精彩",
    )
    .expect("valid positive sentiment regex")
});

const POSITIVE_SCORE: i64 = 4;
const NEUTRAL_SCORE: i64 = 3;
const NEGATIVE_SCORE: i64 = 1;

/// Sender and body split out of a message-shaped text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderCue {
    pub sender: String,
    pub content: String,
}

/// Derives message priority from urgent/normal keywords.
pub fn classify_priority(content: &str, sender: &str) -> Priority {
    let text = format!("{content} {sender}").to_lowercase();
    if URGENT_KEYWORDS.iter().any(|keyword| text.contains(keyword)) {
        return Priority::High;
    }
    if NORMAL_KEYWORDS.iter().any(|keyword| text.contains(keyword)) {
        return Priority::Normal;
    }
    Priority::Low
}

/// Whether the text carries an urgency keyword strong enough to mark it as a
/// message on its own.
pub fn has_urgency_cue(text: &str) -> bool {
    let lowered = text.to_lowercase();
    URGENT_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

pub fn has_memo_keyword(text: &str) -> bool {
    MEMO_KEYWORD_RE.is_match(text)
}

pub fn has_channel_cue(text: &str) -> bool {
    CHANNEL_RE.is_match(text)
}

/// Finds an explicit sender prefix (`from Bob: ...`, `Bob: ...`, `老王说 ...`).
pub fn find_sender(text: &str) -> Option<SenderCue> {
    let caps = SENDER_FROM_RE
        .captures(text)
        .or_else(|| SENDER_SAID_RE.captures(text))
        .or_else(|| {
            SENDER_PREFIX_RE.captures(text).filter(|caps| {
                let label = caps[1].to_lowercase();
                !NON_SENDER_LABELS.contains(&label.as_str())
                    && !label.chars().all(|c| c.is_ascii_digit())
                    && find_content_reference(&label).is_none()
            })
        })?;

    let sender = caps[1].trim().to_string();
    let content = caps[2].trim().to_string();
    if sender.is_empty() || content.is_empty() {
        return None;
    }
    Some(SenderCue { sender, content })
}

/// Finds the first explicit content reference id in the text.
pub fn find_content_reference(text: &str) -> Option<ContentId> {
    let caps = CONTENT_REFERENCE_RE.captures(text)?;
    let digits = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
    digits.as_str().parse().ok()
}

/// Explicit rating in the text, if it falls within 0..=5.
pub fn find_explicit_score(text: &str) -> Option<i64> {
    EXPLICIT_SCORE_RE.captures_iter(text).find_map(|caps| {
        let digit = (1..=4).find_map(|index| caps.get(index))?;
        let score: i64 = digit.as_str().parse().ok()?;
        (0..=5).contains(&score).then_some(score)
    })
}

/// Score implied by sentiment words when no explicit rating is present.
pub fn infer_score(text: &str) -> i64 {
    if NEGATIVE_RE.is_match(text) {
        NEGATIVE_SCORE
    } else if POSITIVE_RE.is_match(text) {
        POSITIVE_SCORE
    } else {
        NEUTRAL_SCORE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_prefers_urgent_over_normal() {
        assert_eq!(classify_priority("urgent: reply today", ""), Priority::High);
        assert_eq!(classify_priority("please confirm the meeting", ""), Priority::Normal);
        assert_eq!(classify_priority("周末一起吃饭", "老王"), Priority::Low);
        assert_eq!(classify_priority("看一下", "客户张总"), Priority::High);
    }

    #[test]
    fn sender_forms() {
        let from = find_sender("from Alice: the build is broken").expect("from form");
        assert_eq!(from.sender, "Alice");
        assert_eq!(from.content, "the build is broken");

        let said = find_sender("老王说：合同明天签").expect("said form");
        assert_eq!(said.sender, "老王");
        assert_eq!(said.content, "合同明天签");

        let prefix = find_sender("Bob: lunch?").expect("prefix form");
        assert_eq!(prefix.sender, "Bob");
    }

    #[test]
    fn labels_are_not_senders() {
        assert!(find_sender("Note: buy milk").is_none());
        assert!(find_sender("https://example.com").is_none());
        assert!(find_sender("just some words").is_none());
        assert!(find_sender("内容12：很好，5分").is_none());
        assert!(find_sender("content12: loved it").is_none());
        assert!(find_sender("article3: meh").is_none());
    }

    #[test]
    fn content_references() {
        assert_eq!(find_content_reference("#42 was great"), Some(42));
        assert_eq!(find_content_reference("Content 7 is boring"), Some(7));
        assert_eq!(find_content_reference("内容12很好"), Some(12));
        assert_eq!(find_content_reference("第3篇不错"), Some(3));
        assert_eq!(find_content_reference("nothing here"), None);
    }

    #[test]
    fn scores_explicit_and_inferred() {
        assert_eq!(find_explicit_score("#4 solid 4/5"), Some(4));
        assert_eq!(find_explicit_score("rate 2"), Some(2));
        assert_eq!(find_explicit_score("5 stars"), Some(5));
        assert_eq!(find_explicit_score("9/5 overhyped"), None);
        assert_eq!(find_explicit_score("我打10分"), None);
        assert_eq!(find_explicit_score("内容3 打5分"), Some(5));
        assert_eq!(find_explicit_score("5分"), Some(5));
        assert_eq!(infer_score("not useful at all"), 1);
        assert_eq!(infer_score("really liked it"), 4);
        assert_eq!(infer_score("不喜欢"), 1);
        assert_eq!(infer_score("ok"), 3);
    }
}
