//! Client route table of the dashboard application.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Landing,
    Dashboard,
    Finance,
    Sales,
    Analytics,
    AiFeatures,
    EmotionAi,
    PersonaGenerator,
    EdgeAi,
    FundingCompliance,
    BusinessDna,
    CommunityHub,
    Integrations,
    Settings,
}

impl Route {
    pub const ALL: [Route; 14] = [
        Route::Landing,
        Route::Dashboard,
        Route::Finance,
        Route::Sales,
        Route::Analytics,
        Route::AiFeatures,
        Route::EmotionAi,
        Route::PersonaGenerator,
        Route::EdgeAi,
        Route::FundingCompliance,
        Route::BusinessDna,
        Route::CommunityHub,
        Route::Integrations,
        Route::Settings,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Dashboard => "/dashboard",
            Route::Finance => "/finance",
            Route::Sales => "/sales",
            Route::Analytics => "/analytics",
            Route::AiFeatures => "/ai-features",
            Route::EmotionAi => "/ai-features/emotion",
            Route::PersonaGenerator => "/ai-features/persona",
            Route::EdgeAi => "/ai-features/edge",
            Route::FundingCompliance => "/ai-features/funding",
            Route::BusinessDna => "/ai-features/dna",
            Route::CommunityHub => "/ai-features/community",
            Route::Integrations => "/integrations",
            Route::Settings => "/settings",
        }
    }

    /// Match an exact path; a single trailing slash is tolerated
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = match path.strip_suffix('/') {
            Some("") | None => path,
            Some(stripped) => stripped,
        };
        Route::ALL.into_iter().find(|route| route.path() == trimmed)
    }

    /// Everything except the landing page requires a session
    pub fn is_protected(self) -> bool {
        self != Route::Landing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(Route::from_path("/"), Some(Route::Landing));
        assert_eq!(Route::from_path("/dashboard"), Some(Route::Dashboard));
        assert_eq!(Route::from_path("/dashboard/"), Some(Route::Dashboard));
        assert_eq!(
            Route::from_path("/ai-features/dna"),
            Some(Route::BusinessDna)
        );
        assert_eq!(Route::from_path("/admin"), None);
        assert_eq!(Route::from_path("/ai-features/unknown"), None);
    }

    #[test]
    fn test_only_landing_is_public() {
        let public: Vec<_> = Route::ALL
            .into_iter()
            .filter(|route| !route.is_protected())
            .collect();
        assert_eq!(public, vec![Route::Landing]);
    }

    #[test]
    fn test_paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }
}
