/// The identity a request claims to act as.
///
/// There is no authentication behind this: the name comes straight from the
/// request and is compared as plain text against the stored owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    name: String,
    is_admin: bool,
}

impl Caller {
    pub fn new(name: &str, admin_name: &str) -> Self {
        let name = name.trim().to_string();
        let is_admin = name == admin_name;
        Self { name, is_admin }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Owners and the admin may update or delete an aggregate.
    pub fn can_modify(&self, owner: &str) -> bool {
        self.is_admin || self.name == owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_can_modify() {
        let caller = Caller::new("demo", "admin");
        assert!(caller.can_modify("demo"));
        assert!(!caller.can_modify("someone-else"));
        assert!(!caller.is_admin());
    }

    #[test]
    fn admin_can_modify_anything() {
        let caller = Caller::new("admin", "admin");
        assert!(caller.is_admin());
        assert!(caller.can_modify("demo"));
    }

    #[test]
    fn admin_name_is_configurable() {
        let caller = Caller::new("root", "root");
        assert!(caller.can_modify("demo"));
        assert!(!Caller::new("admin", "root").can_modify("demo"));
    }

    #[test]
    fn comparison_is_exact() {
        let caller = Caller::new("Demo", "admin");
        assert!(!caller.can_modify("demo"));
    }
}
