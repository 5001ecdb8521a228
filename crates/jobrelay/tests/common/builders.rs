//! Builders for raw test messages.

#![allow(dead_code)]

pub const INDEED_SUBJECT: &str = "【新しい応募者のお知らせ】山田 花子さん";
pub const JIMOTY_SUBJECT: &str = "ジモティーからのお知らせ";

/// Builds a raw RFC 5322 message with an optional HTML body.
pub struct MessageBuilder {
    message_id: Option<String>,
    from: String,
    subject: String,
    html: Option<String>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self {
            message_id: None,
            from: "\"山田 花子\" <hanako@example.com>".to_string(),
            subject: "Hello".to_string(),
            html: None,
        }
    }

    pub fn indeed() -> Self {
        Self::new()
            .from("\"山田 花子\" <noreply@indeed.com>")
            .subject(INDEED_SUBJECT)
    }

    pub fn jimoty() -> Self {
        Self::new()
            .from("佐藤 <noreply@jmty.jp>")
            .subject(JIMOTY_SUBJECT)
    }

    pub fn message_id(mut self, id: &str) -> Self {
        self.message_id = Some(id.to_string());
        self
    }

    pub fn from(mut self, from: &str) -> Self {
        self.from = from.to_string();
        self
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    pub fn html(mut self, html: &str) -> Self {
        self.html = Some(html.to_string());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut raw = String::new();
        if let Some(id) = &self.message_id {
            raw.push_str(&format!("Message-ID: {}\r\n", id));
        }
        raw.push_str(&format!("From: {}\r\n", self.from));
        raw.push_str("To: jobs@example.com\r\n");
        raw.push_str(&format!("Subject: {}\r\n", self.subject));
        raw.push_str("Date: Mon, 4 Mar 2024 10:00:00 +0900\r\n");
        raw.push_str("MIME-Version: 1.0\r\n");
        match &self.html {
            Some(html) => {
                raw.push_str("Content-Type: text/html; charset=utf-8\r\n");
                raw.push_str("Content-Transfer-Encoding: 8bit\r\n\r\n");
                raw.push_str(html);
            }
            None => {
                raw.push_str("Content-Type: text/plain; charset=utf-8\r\n\r\n");
                raw.push_str("body\r\n");
            }
        }
        raw.into_bytes()
    }
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}
