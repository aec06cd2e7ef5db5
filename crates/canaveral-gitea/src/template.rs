//! `${field}` placeholder substitution

use crate::context::ReleaseContext;

/// Replace every supported placeholder in `template`.
///
/// Supported: `${version}`, `${latestVersion}`, `${changelog}`, `${name}`,
/// `${repo.owner}`, `${repo.repository}`, `${branchName}`. Anything else is
/// left untouched.
pub fn interpolate(template: &str, context: &ReleaseContext) -> String {
    let replacements: [(&str, &str); 7] = [
        ("${version}", &context.version),
        ("${latestVersion}", &context.latest_version),
        ("${changelog}", &context.changelog),
        ("${name}", &context.name),
        ("${repo.owner}", &context.repo.owner),
        ("${repo.repository}", &context.repo.repository),
        ("${branchName}", &context.branch_name),
    ];

    replacements
        .iter()
        .fold(template.to_string(), |acc, (placeholder, value)| {
            acc.replace(placeholder, value)
        })
}
