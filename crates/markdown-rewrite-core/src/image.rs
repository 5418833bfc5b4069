//! Image reference normalization.
//!
//! Both `![[name]]` embeds and `![description](path/to/name)` images are
//! rewritten to `![](<image dir>/<name>)` with spaces escaped as `%20`.
//! Every other character, including non-ASCII, is copied verbatim.
//! References already pointing into the image directory are left alone.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::report::RewriteReport;

fn embed_image() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"!\[\[(.*?)\]\]").expect("embed pattern is valid"))
}

fn standard_image() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // One level of nested brackets in the description and of parentheses in the link.
    PATTERN.get_or_init(|| {
        Regex::new(
            r"!\[([^\[\]\n]*(?:\[[^\[\]\n]*\][^\[\]\n]*)*)\]\(([^()\n]*(?:\([^()\n]*\)[^()\n]*)*)\)",
        )
        .expect("standard image pattern is valid")
    })
}

/// Escape the spaces of an image name for use in a canonical link.
pub fn encode_name(name: &str) -> String {
    name.replace(' ', "%20")
}

/// Last `/`-separated segment of a link.
pub fn basename(link: &str) -> &str {
    link.rsplit('/').next().unwrap_or(link)
}

/// Canonical reference for an already-encoded name.
pub fn canonical_reference(image_prefix: &str, encoded_name: &str) -> String {
    format!("![]({image_prefix}{encoded_name})")
}

/// Rewrite every `![[name]]` embed into a canonical reference.
pub fn rewrite_embeds(text: &str, image_prefix: &str, report: &mut RewriteReport) -> String {
    embed_image()
        .replace_all(text, |caps: &Captures<'_>| {
            report.embeds_rewritten += 1;
            canonical_reference(image_prefix, &encode_name(&caps[1]))
        })
        .into_owned()
}

/// Rewrite every standard image whose link is outside `image_prefix`.
pub fn rewrite_standard_images(
    text: &str,
    image_prefix: &str,
    report: &mut RewriteReport,
) -> String {
    standard_image()
        .replace_all(text, |caps: &Captures<'_>| {
            let link = &caps[2];
            if link.starts_with(image_prefix) {
                return caps[0].to_string();
            }
            report.images_rewritten += 1;
            canonical_reference(image_prefix, &encode_name(basename(link)))
        })
        .into_owned()
}
