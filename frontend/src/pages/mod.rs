//! One module per page. Each owns a plain state struct loaded through
//! [`PageState`](crate::hooks::use_page_data::PageState), the pure
//! derivations over it, and the Yew component wiring forms to the API.

use yew::prelude::*;

use crate::services::api::ApiClient;

pub mod animals;
pub mod breedings;
pub mod dashboard;
pub mod feed_costs;
pub mod harvests;
pub mod kindlings;
pub mod reports;
pub mod sales;
pub mod weanings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Animals,
    Breedings,
    Kindlings,
    Weanings,
    Harvests,
    FeedCosts,
    Sales,
    Reports,
}

impl Page {
    pub const ALL: [Page; 9] = [
        Page::Dashboard,
        Page::Animals,
        Page::Breedings,
        Page::Kindlings,
        Page::Weanings,
        Page::Harvests,
        Page::FeedCosts,
        Page::Sales,
        Page::Reports,
    ];

    /// Page named by `<body data-page="...">`
    pub fn from_identifier(identifier: &str) -> Option<Page> {
        Page::ALL.into_iter().find(|p| p.identifier() == identifier.trim())
    }

    pub fn identifier(&self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Animals => "animals",
            Page::Breedings => "breedings",
            Page::Kindlings => "kindlings",
            Page::Weanings => "weanings",
            Page::Harvests => "harvests",
            Page::FeedCosts => "feed-costs",
            Page::Sales => "sales",
            Page::Reports => "reports",
        }
    }

    /// Server-rendered URL of the page
    pub fn path(&self) -> String {
        match self {
            Page::Dashboard => "/dashboard".to_string(),
            other => format!("/ranch/{}", other.identifier()),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Animals => "Animals",
            Page::Breedings => "Breedings",
            Page::Kindlings => "Kindlings",
            Page::Weanings => "Weanings",
            Page::Harvests => "Harvests",
            Page::FeedCosts => "Feed Costs",
            Page::Sales => "Sales",
            Page::Reports => "Reports",
        }
    }

    pub fn render(&self, props: PageProps) -> Html {
        match self {
            Page::Dashboard => html! { <dashboard::DashboardPage ..props /> },
            Page::Animals => html! { <animals::AnimalsPage ..props /> },
            Page::Breedings => html! { <breedings::BreedingsPage ..props /> },
            Page::Kindlings => html! { <kindlings::KindlingsPage ..props /> },
            Page::Weanings => html! { <weanings::WeaningsPage ..props /> },
            Page::Harvests => html! { <harvests::HarvestsPage ..props /> },
            Page::FeedCosts => html! { <feed_costs::FeedCostsPage ..props /> },
            Page::Sales => html! { <sales::SalesPage ..props /> },
            Page::Reports => html! { <reports::ReportsPage ..props /> },
        }
    }
}

/// Props every page component takes
#[derive(Properties, PartialEq, Clone)]
pub struct PageProps {
    pub api_client: ApiClient,
    /// Bumped by the header's Refresh button
    pub refresh: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_round_trip() {
        for page in Page::ALL {
            assert_eq!(Page::from_identifier(page.identifier()), Some(page));
        }
        assert_eq!(Page::from_identifier("feed-costs"), Some(Page::FeedCosts));
        assert_eq!(Page::from_identifier("settings"), None);
        assert_eq!(Page::from_identifier(""), None);
    }

    #[test]
    fn test_paths() {
        assert_eq!(Page::Dashboard.path(), "/dashboard");
        assert_eq!(Page::FeedCosts.path(), "/ranch/feed-costs");
        assert_eq!(Page::Sales.path(), "/ranch/sales");
    }
}
