//! Message bodies rendered with askama.

use anyhow::anyhow;
use askama::Template;
use domains::Notification;
use url::Url;

#[derive(Template)]
#[template(path = "confirm_email.html")]
struct ConfirmEmailHtml<'a> {
    email: &'a str,
    code: &'a str,
    confirm_url: &'a str,
}

#[derive(Template)]
#[template(path = "confirm_email.txt")]
struct ConfirmEmailText<'a> {
    email: &'a str,
    code: &'a str,
    confirm_url: &'a str,
}

/// A notification ready to hand to a delivery backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// `{base_url}/userEmailConfirm/{email}/{code}` with each segment percent-encoded.
fn confirm_link(base_url: &str, email: &str, code: &str) -> anyhow::Result<String> {
    let mut url = Url::parse(base_url)?;
    url.path_segments_mut()
        .map_err(|()| anyhow!("`{base_url}` cannot carry a path"))?
        .pop_if_empty()
        .extend(["userEmailConfirm", email, code]);
    Ok(url.into())
}

/// Renders `notification`; links point at `base_url`.
pub fn render(notification: &Notification, base_url: &str) -> anyhow::Result<RenderedMessage> {
    match notification {
        Notification::ConfirmEmail { email, code } => {
            let confirm_url = confirm_link(base_url, email, code)?;
            let html = ConfirmEmailHtml {
                email,
                code,
                confirm_url: &confirm_url,
            }
            .render()?;
            let text = ConfirmEmailText {
                email,
                code,
                confirm_url: &confirm_url,
            }
            .render()?;

            Ok(RenderedMessage {
                to: email.clone(),
                subject: "Please confirm your email address".to_string(),
                text,
                html,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirm(email: &str, code: &str) -> Notification {
        Notification::ConfirmEmail {
            email: email.into(),
            code: code.into(),
        }
    }

    #[test]
    fn confirmation_embeds_email_code_and_link() {
        let message = render(&confirm("b@x.com", "123"), "https://ideas.example/").unwrap();
        assert_eq!(message.to, "b@x.com");
        assert!(message.text.contains("https://ideas.example/userEmailConfirm/b@x.com/123"));
        assert!(message.html.contains("b@x.com"));
        assert!(message.html.contains("123"));
    }

    #[test]
    fn link_segments_are_percent_encoded() {
        let message = render(&confirm("b@x.com", "a%2Fb/c d"), "https://ideas.example/app").unwrap();
        assert!(message
            .text
            .contains("https://ideas.example/app/userEmailConfirm/b@x.com/a%252Fb%2Fc%20d"));
    }

    #[test]
    fn unusable_base_url_is_an_error() {
        assert!(render(&confirm("b@x.com", "1"), "mailto:someone").is_err());
        assert!(render(&confirm("b@x.com", "1"), "not a url").is_err());
    }

    #[test]
    fn html_body_is_escaped() {
        let message = render(&confirm("b@x.com", "<script>"), "http://localhost").unwrap();
        assert!(!message.html.contains("<script>"));
        assert!(message.text.contains("<script>"));
    }
}
