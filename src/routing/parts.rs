//! Repository URL decomposition.

use thiserror::Error;
use url::Url;

/// An upstream URL split into `/user`, `/repo`, the rest of the path and the
/// raw query string. Each path part keeps its leading slash so the parts can
/// be concatenated onto a new base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPath {
    pub user: String,
    pub repo: String,
    pub rest: String,
    pub query: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("URL path '{0}' is too short, expected /<user>/<repo>")]
pub struct PathTooShort(pub String);

pub fn split_repo_path(url: &Url) -> Result<RepoPath, PathTooShort> {
    let path = url.path();
    let mut parts = path.trim_start_matches('/').splitn(3, '/');

    let (user, repo) = match (parts.next(), parts.next()) {
        (Some(user), Some(repo)) if !user.is_empty() && !repo.is_empty() => (user, repo),
        _ => return Err(PathTooShort(path.to_string())),
    };
    let rest = parts.next().map(|r| format!("/{}", r)).unwrap_or_default();

    Ok(RepoPath {
        user: format!("/{}", user),
        repo: format!("/{}", repo),
        rest,
        query: url.query().map(str::to_string),
    })
}

impl RepoPath {
    /// Re-root the path on `base`, keeping the query string untouched.
    pub fn rebase(&self, base: &Url) -> Result<Url, url::ParseError> {
        let mut joined = format!(
            "{}{}{}{}",
            base.as_str().trim_end_matches('/'),
            self.user,
            self.repo,
            self.rest
        );
        if let Some(query) = &self.query {
            joined.push('?');
            joined.push_str(query);
        }
        Url::parse(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_owner_repo_and_rest() {
        let url = Url::parse("https://github.com/u/r/info/refs?service=git-upload-pack").unwrap();
        let parts = split_repo_path(&url).unwrap();
        assert_eq!(
            parts,
            RepoPath {
                user: "/u".into(),
                repo: "/r".into(),
                rest: "/info/refs".into(),
                query: Some("service=git-upload-pack".into()),
            }
        );
    }

    #[test]
    fn rest_may_be_empty() {
        let url = Url::parse("https://github.com/u/r").unwrap();
        let parts = split_repo_path(&url).unwrap();
        assert_eq!(parts.rest, "");
        assert_eq!(parts.query, None);
    }

    #[test]
    fn rejects_short_paths() {
        let url = Url::parse("https://github.com/u").unwrap();
        assert_eq!(split_repo_path(&url), Err(PathTooShort("/u".into())));
    }

    #[test]
    fn rebase_onto_accelerator() {
        let url = Url::parse("https://github.com/u/r/info/refs?service=git-upload-pack&x=%2F").unwrap();
        let base = Url::parse("http://127.0.0.1:9000").unwrap();
        let rebased = split_repo_path(&url).unwrap().rebase(&base).unwrap();
        assert_eq!(
            rebased.as_str(),
            "http://127.0.0.1:9000/u/r/info/refs?service=git-upload-pack&x=%2F"
        );
    }
}
