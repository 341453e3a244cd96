//! Fragment wrapping.

/// Opening of the root element every complete document starts with.
pub const ROOT_TAG: &str = "<mjml";

/// Whether `content` is a fragment that needs [`wrap_into_mjml_tags`].
pub fn needs_wrapping(content: &str) -> bool {
    !content.trim().starts_with(ROOT_TAG)
}

/// Wrap a markup fragment into an `<mjml><mj-body>` envelope.
pub fn wrap_into_mjml_tags(content: &str) -> String {
    format!("<mjml>\n  <mj-body>\n    {content}\n  </mj-body>\n</mjml>")
}
