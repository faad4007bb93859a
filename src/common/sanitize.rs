use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Script and style elements are dropped with their content, not just
    // the tags.
    static ref BLOCKED_ELEMENT: Regex =
        Regex::new(r"(?is)<script\b[^>]*>.*?</script>|<style\b[^>]*>.*?</style>").unwrap();
    static ref TAG: Regex = Regex::new(r"<[^>]*>?").unwrap();
}

/// Small tag stripper for user-entered text. Not a full HTML sanitizer.
pub fn sanitize_input(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let without_blocked = BLOCKED_ELEMENT.replace_all(input, "");
    TAG.replace_all(&without_blocked, "").into_owned()
}
