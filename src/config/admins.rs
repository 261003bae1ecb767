use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use derive_more::{Display as DisplayDerive, Error};
use teloxide::types::UserId;

/// Allow-list of users who may open the admin panel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdminIds(HashSet<UserId>);

#[derive(Debug, DisplayDerive, Error)]
#[display("invalid admin id '{value}': {source}")]
pub struct InvalidAdminIds {
    value: String,
    source: std::num::ParseIntError,
}

impl AdminIds {
    pub fn contains(&self, uid: UserId) -> bool {
        self.0.contains(&uid)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = UserId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<UserId> for AdminIds {
    fn from_iter<T: IntoIterator<Item = UserId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for AdminIds {
    type Err = InvalidAdminIds;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<u64>()
                .map(UserId)
                .map_err(|source| InvalidAdminIds { value: part.to_owned(), source }))
            .collect()
    }
}

impl Display for AdminIds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<u64> = self.0.iter().map(|uid| uid.0).collect();
        ids.sort_unstable();
        let joined = ids.iter()
            .map(u64::to_string)
            .collect::<Vec<String>>()
            .join(",");
        f.write_str(&joined)
    }
}

#[cfg(test)]
mod test {
    use teloxide::types::UserId;
    use super::AdminIds;

    #[test]
    fn parse() {
        let admins: AdminIds = " 123, 456,,789 ".parse()
            .expect("the list must be parsed");
        assert!(admins.contains(UserId(123)));
        assert!(admins.contains(UserId(456)));
        assert!(admins.contains(UserId(789)));
        assert!(!admins.contains(UserId(1)));
        assert_eq!(admins.to_string(), "123,456,789");
    }

    #[test]
    fn parse_empty() {
        let admins: AdminIds = "".parse()
            .expect("an empty list must be parsed");
        assert!(admins.is_empty());
    }

    #[test]
    fn parse_invalid() {
        let err = "123,abc".parse::<AdminIds>()
            .expect_err("non-numeric ids must be rejected");
        assert!(err.to_string().contains("'abc'"));
    }
}
