/// Rewrites `/home/<user>/...` prefixes to `/home/$USER/...`.
///
/// Used by the normalizer to anonymize `CoreFrame::file_name`. Any path not
/// matching the `/home/<single-component>/` shape is returned unchanged (as
/// a borrow, to avoid allocating on the common no-op path).
pub fn anonymize_home_dir(path: &str) -> std::borrow::Cow<'_, str> {
    const PREFIX: &str = "/home/";

    let Some(rest) = path.strip_prefix(PREFIX) else {
        return std::borrow::Cow::Borrowed(path);
    };

    let user_end = match rest.find('/') {
        Some(idx) => idx,
        None => return std::borrow::Cow::Borrowed(path),
    };

    if user_end == 0 {
        return std::borrow::Cow::Borrowed(path);
    }

    let mut rewritten = String::with_capacity(path.len());
    rewritten.push_str(PREFIX);
    rewritten.push_str("$USER");
    rewritten.push_str(&rest[user_end..]);
    std::borrow::Cow::Owned(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_home_prefix() {
        assert_eq!(
            anonymize_home_dir("/home/jdoe/project/src/main.c"),
            "/home/$USER/project/src/main.c"
        );
    }

    #[test]
    fn leaves_other_paths_untouched() {
        assert_eq!(anonymize_home_dir("/usr/lib/libc.so.6"), "/usr/lib/libc.so.6");
        assert_eq!(anonymize_home_dir("/home/"), "/home/");
        assert_eq!(anonymize_home_dir("/home/jdoe"), "/home/jdoe");
    }
}
