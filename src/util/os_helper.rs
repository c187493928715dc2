/// Real name of the current user, the login name when it is not set
pub fn get_name() -> String {
    let name = whoami::realname();
    if name.trim().is_empty() {
        return whoami::username();
    }
    name
}
