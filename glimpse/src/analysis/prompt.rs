//! Analysis instruction construction.

use std::fmt::Write as _;

/// Build the instruction sent to the reasoning step.
///
/// The query is embedded verbatim, followed by a summary of the attached media.
#[must_use]
pub fn build_prompt(query: &str, image_count: usize, has_video: bool) -> String {
    let mut prompt = String::with_capacity(query.len() + 320);
    prompt.push_str("Analyze the uploaded media (video and images) for content and context.\n");
    prompt.push_str(
        "Respond to the following query using insights from the provided media and supplementary web research:\n",
    );
    prompt.push_str(query);
    prompt.push_str("\n\nMedia Details:\n");
    let _ = writeln!(prompt, "- Number of Images: {image_count}");
    let _ = writeln!(prompt, "- Video Uploaded: {}", if has_video { "Yes" } else { "No" });
    prompt.push_str("\nProvide a detailed, user-friendly, and actionable response.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_query_and_media_summary() {
        let prompt = build_prompt("Summarize this video", 0, true);
        assert!(prompt.contains("\nSummarize this video\n"));
        assert!(prompt.contains("- Number of Images: 0"));
        assert!(prompt.contains("- Video Uploaded: Yes"));
        assert!(prompt.ends_with("actionable response."));
    }

    #[test]
    fn reports_image_count_without_video() {
        let prompt = build_prompt("Compare these", 3, false);
        assert!(prompt.contains("- Number of Images: 3"));
        assert!(prompt.contains("- Video Uploaded: No"));
    }

    #[test]
    fn query_is_not_rewritten() {
        let query = "  What's *here*?\nSecond line  ";
        assert!(build_prompt(query, 1, false).contains(query));
    }
}
