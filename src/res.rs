//! Embedded page templates and the renderer that fills them.
//!
//! Templates live under `res/pages` and are compiled into the binary. A
//! template is plain HTML with `{name}` placeholders; anything between braces
//! that is not a lowercase identifier (CSS blocks, for one) is left alone.

use std::collections::BTreeMap;

use crate::{AppError, AppResult};

#[macro_export]
macro_rules! include_res {
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

/// Values substituted into a template, keyed by placeholder name.
#[derive(Debug, Default, Clone)]
pub struct Context(BTreeMap<&'static str, String>);

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain text, HTML-escaped on insertion.
    pub fn text(mut self, key: &'static str, value: impl AsRef<str>) -> Self {
        self.0.insert(key, escape(value.as_ref()));
        self
    }

    /// Markup that was already rendered or escaped.
    pub fn html(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.0.insert(key, value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Turns a named template and a [`Context`] into HTML.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, name: &str, ctx: &Context) -> AppResult<String>;
}

/// Renderer backed by the templates embedded from `res/pages`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResTemplates;

impl ResTemplates {
    fn source(name: &str) -> Option<&'static str> {
        Some(match name {
            "base" => include_res!(str, "/pages/base.html"),
            "index" => include_res!(str, "/pages/index.html"),
            "follow" => include_res!(str, "/pages/follow.html"),
            "group" => include_res!(str, "/pages/group.html"),
            "profile" => include_res!(str, "/pages/profile.html"),
            "post" => include_res!(str, "/pages/post.html"),
            "post_edit" => include_res!(str, "/pages/post_edit.html"),
            "includes/nav" => include_res!(str, "/pages/includes/nav.html"),
            "includes/post_item" => include_res!(str, "/pages/includes/post_item.html"),
            "includes/comment" => include_res!(str, "/pages/includes/comment.html"),
            "includes/paginator" => include_res!(str, "/pages/includes/paginator.html"),
            "auth/login" => include_res!(str, "/pages/auth/login.html"),
            "auth/signup" => include_res!(str, "/pages/auth/signup.html"),
            "misc/404" => include_res!(str, "/pages/misc/404.html"),
            "misc/500" => include_res!(str, "/pages/misc/500.html"),
            _ => return None,
        })
    }
}

impl TemplateRenderer for ResTemplates {
    fn render(&self, name: &str, ctx: &Context) -> AppResult<String> {
        let source = Self::source(name).ok_or_else(|| AppError::Template(name.to_owned()))?;
        Ok(fill(source, ctx))
    }
}

/// Single pass over `source`, so substituted values are never rescanned.
fn fill(source: &str, ctx: &Context) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let placeholder = after.find('}').and_then(|close| {
            let key = &after[..close];
            let is_ident = !key.is_empty()
                && key.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
            is_ident.then(|| (close, ctx.get(key)))
        });

        match placeholder {
            Some((close, Some(value))) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            Some((close, None)) => {
                // unknown placeholders render empty
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

pub fn escape(value: &str) -> String {
    maud::html! { (value) }.into_string()
}
