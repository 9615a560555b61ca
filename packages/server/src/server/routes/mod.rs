// HTTP routes
pub mod health;
pub mod login;
pub mod session_pages;
pub mod validate;

pub use health::*;
pub use login::*;
pub use session_pages::*;
pub use validate::*;

/// Minimal page wrapper; form rendering is deliberately plain.
pub(crate) fn html_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{title}</title></head>\
         <body><h2>{title}</h2>{body}</body></html>"
    )
}
