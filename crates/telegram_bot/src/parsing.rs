//! Callback data carried by inline buttons.
//!
//! Telegram limits callback data to 64 bytes, so every variant encodes to a
//! short `section:action[:arg]` string.

use uuid::Uuid;

/// A list the user can browse, fill and prune from the chat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Section {
    Assets,
    Incomes,
    Expenses,
    Incoming,
    Outgoing,
}

impl Section {
    pub(crate) const CATEGORIES: [Section; 3] = [Self::Assets, Self::Incomes, Self::Expenses];
    pub(crate) const TRANSACTIONS: [Section; 2] = [Self::Incoming, Self::Outgoing];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Assets => "assets",
            Self::Incomes => "incomes",
            Self::Expenses => "expenses",
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
        }
    }

    /// Breadcrumb shown above the section buttons.
    pub(crate) fn title(self) -> &'static str {
        match self {
            Self::Assets => "Categories > Assets",
            Self::Incomes => "Categories > Incomes",
            Self::Expenses => "Categories > Expenses",
            Self::Incoming => "Transactions > Incoming",
            Self::Outgoing => "Transactions > Outgoing",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Assets => "Assets",
            Self::Incomes => "Incomes",
            Self::Expenses => "Expenses",
            Self::Incoming => "Incoming",
            Self::Outgoing => "Outgoing",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "assets" => Some(Self::Assets),
            "incomes" => Some(Self::Incomes),
            "expenses" => Some(Self::Expenses),
            "incoming" => Some(Self::Incoming),
            "outgoing" => Some(Self::Outgoing),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Callback {
    /// Open the show/create/delete menu of a section.
    Open(Section),
    Show { section: Section, page: u64 },
    Create(Section),
    DeleteMenu { section: Section, page: u64 },
    Delete { section: Section, id: Uuid },
    /// Answer to a dialog step that asks to choose an item.
    Pick(Uuid),
    PickPage(u64),
}

impl Callback {
    pub(crate) fn encode(&self) -> String {
        match self {
            Self::Open(section) => format!("{}:open", section.as_str()),
            Self::Show { section, page } => format!("{}:show:{page}", section.as_str()),
            Self::Create(section) => format!("{}:create", section.as_str()),
            Self::DeleteMenu { section, page } => format!("{}:delmenu:{page}", section.as_str()),
            Self::Delete { section, id } => format!("{}:del:{}", section.as_str(), id.simple()),
            Self::Pick(id) => format!("pick:{}", id.simple()),
            Self::PickPage(page) => format!("pick:page:{page}"),
        }
    }

    pub(crate) fn parse(data: &str) -> Option<Self> {
        let mut parts = data.splitn(3, ':');
        let head = parts.next()?;
        let action = parts.next()?;
        let arg = parts.next();

        if head == "pick" {
            return match (action, arg) {
                ("page", Some(page)) => page.parse().ok().map(Self::PickPage),
                (id, None) => Uuid::parse_str(id).ok().map(Self::Pick),
                _ => None,
            };
        }

        let section = Section::parse(head)?;
        match (action, arg) {
            ("open", None) => Some(Self::Open(section)),
            ("create", None) => Some(Self::Create(section)),
            ("show", Some(page)) => Some(Self::Show {
                section,
                page: parse_page(page)?,
            }),
            ("delmenu", Some(page)) => Some(Self::DeleteMenu {
                section,
                page: parse_page(page)?,
            }),
            ("del", Some(id)) => Some(Self::Delete {
                section,
                id: Uuid::parse_str(id).ok()?,
            }),
            _ => None,
        }
    }
}

fn parse_page(value: &str) -> Option<u64> {
    value.parse().ok().filter(|page| *page > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_callback_fits_telegram_limit() {
        let data = Callback::Delete {
            section: Section::Outgoing,
            id: Uuid::new_v4(),
        }
        .encode();
        assert!(data.len() <= 64, "{data}");
        assert!(matches!(
            Callback::parse(&data),
            Some(Callback::Delete {
                section: Section::Outgoing,
                ..
            })
        ));
    }

    #[test]
    fn pick_and_paging() {
        let id = Uuid::new_v4();
        assert_eq!(
            Callback::parse(&Callback::Pick(id).encode()),
            Some(Callback::Pick(id))
        );
        assert_eq!(Callback::parse("pick:page:3"), Some(Callback::PickPage(3)));
        assert_eq!(
            Callback::parse("incomes:show:2"),
            Some(Callback::Show {
                section: Section::Incomes,
                page: 2
            })
        );
    }

    #[test]
    fn garbage_is_ignored() {
        for data in ["", "assets", "vaults:open", "assets:show:0", "assets:del:nope", "pick:"] {
            assert_eq!(Callback::parse(data), None, "{data}");
        }
    }
}
