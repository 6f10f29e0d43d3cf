//! Location paths understood by the catalog

pub const LIST_PATH: &str = "/list";
const DETAIL_PREFIX: &str = "/pokemon/";

/// The two logical views
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// `/list`
    List,
    /// `/pokemon/{id}`
    Pokemon(String),
}

impl Route {
    /// Reads a location path. Anything that is not a detail path with a
    /// non-empty id segment is the list view.
    pub fn parse(path: &str) -> Self {
        let path = path.trim();
        let path = path.split(['?', '#']).next().unwrap_or_default();
        match path.strip_prefix(DETAIL_PREFIX) {
            Some(rest) => {
                let id = rest.trim_end_matches('/');
                if id.is_empty() || id.contains('/') {
                    Route::List
                } else {
                    Route::Pokemon(id.to_string())
                }
            }
            None => Route::List,
        }
    }

    pub fn pokemon(id: impl Into<String>) -> Self {
        Route::Pokemon(id.into())
    }

    pub fn path(&self) -> String {
        match self {
            Route::List => LIST_PATH.to_string(),
            Route::Pokemon(id) => format!("{DETAIL_PREFIX}{id}"),
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        match self {
            Route::List => None,
            Route::Pokemon(id) => Some(id.as_str()),
        }
    }
}
