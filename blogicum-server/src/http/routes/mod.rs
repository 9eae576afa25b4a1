//! Route handlers organized by resource
//!
//! GET handlers answer with the page context as JSON. Form submissions
//! answer with a `303 See Other` redirect on success.

pub mod health;
pub mod posts;
pub mod comments;
pub mod categories;
pub mod profiles;
pub mod accounts;

/// URL builders for redirects
pub mod paths {
    use urlencoding::encode;

    pub fn index() -> String {
        "/".to_string()
    }

    pub fn post_detail(post_id: i64) -> String {
        format!("/posts/{}/", post_id)
    }

    pub fn profile(username: &str) -> String {
        format!("/profile/{}/", encode(username))
    }

    pub fn login(next: Option<&str>) -> String {
        match next {
            Some(next) => format!("/auth/login/?next={}", encode(next)),
            None => "/auth/login/".to_string(),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn builds_paths() {
            assert_eq!(index(), "/");
            assert_eq!(post_detail(12), "/posts/12/");
            assert_eq!(profile("leo"), "/profile/leo/");
            assert_eq!(login(None), "/auth/login/");
            assert_eq!(login(Some("/posts/1/edit/")), "/auth/login/?next=%2Fposts%2F1%2Fedit%2F");
        }

        #[test]
        fn profile_path_is_ascii() {
            let path = profile("лев+tolstoy@ya");
            assert!(path.is_ascii());
            assert_eq!(path, "/profile/%D0%BB%D0%B5%D0%B2%2Btolstoy%40ya/");
        }
    }
}
