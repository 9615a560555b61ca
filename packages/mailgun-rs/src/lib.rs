// https://documentation.mailgun.com/docs/mailgun/api-reference/send/mailgun/messages/

use std::collections::HashMap;

pub mod models;
use reqwest::Client;

use crate::models::SendResponse;

#[derive(Debug, Clone)]
pub struct MailgunOptions {
    pub api_key: String,
    pub domain: String,
}

#[derive(Debug, Clone)]
pub struct MailgunService {
    options: MailgunOptions,
}

/// A single outbound message. `html` is pre-rendered markup.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub to: String,
    pub reply_to: Option<String>,
    pub sender: String,
    pub subject: String,
    pub html: String,
}

impl MailgunService {
    pub fn new(options: MailgunOptions) -> Self {
        Self { options }
    }

    pub async fn send_message(
        self: &MailgunService,
        message: &OutboundMessage,
    ) -> Result<SendResponse, &'static str> {
        let api_key = self.options.api_key.clone();
        let domain = self.options.domain.clone();

        let url = format!("https://api.mailgun.net/v3/{domain}/messages");

        let mut form_body: HashMap<&str, String> = HashMap::new();
        form_body.insert("from", message.sender.clone());
        form_body.insert("to", message.to.clone());
        form_body.insert("subject", message.subject.clone());
        form_body.insert("html", message.html.clone());
        if let Some(reply_to) = &message.reply_to {
            form_body.insert("h:Reply-To", reply_to.clone());
        }

        let client = Client::new();
        let res = client
            .post(url)
            .basic_auth("api", Some(api_key))
            .form(&form_body)
            .send()
            .await;

        match res {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    // Log the error response from Mailgun
                    let error_body = response.text().await.unwrap_or_default();
                    eprintln!("Mailgun error ({}): {}", status, error_body);
                    return Err("Mailgun returned an error");
                }

                let result = response.json::<SendResponse>().await;
                match result {
                    Ok(data) => Ok(data),
                    Err(e) => {
                        eprintln!("Failed to parse Mailgun response: {}", e);
                        Err("Error parsing send response")
                    }
                }
            }
            Err(e) => {
                eprintln!("Request to Mailgun failed: {}", e);
                Err("Error sending message")
            }
        }
    }
}
