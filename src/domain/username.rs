use std::ops::Deref;
use derive_more::{Constructor, From};
use teloxide::types::User;

#[derive(Debug, Clone, Constructor, From, Eq, PartialEq)]
pub struct Username(String);

impl Username {
    pub fn from_user(user: &User) -> Self {
        Self(user.first_name.clone())
    }

    pub fn value_ref(&self) -> &str {
        &self.0
    }

    pub fn escaped(&self) -> String {
        teloxide::utils::html::escape(self.value_ref())
    }
}

impl Deref for Username {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

#[cfg(test)]
mod test {
    use super::Username;

    #[test]
    fn escaped() {
        let name = Username::new("<b>Tom & Jerry</b>".to_owned());
        assert_eq!(name.escaped(), "&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;");
    }
}
