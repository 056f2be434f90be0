// Icon keys must match the asset names uploaded for the presence application.

/// Host application icon. Used as the small badge next to a file-type icon,
/// and as the large icon when no file type could be resolved.
pub const HOST_IMAGE_KEY: &str = "neovim";

// Whole file names take priority over extensions (`Cargo.toml` before `.toml`).
const FILE_NAME_ICONS: &[(&str, &str)] = &[
    ("dockerfile", "docker"),
    ("docker-compose.yml", "docker"),
    ("makefile", "makefile"),
    ("cargo.toml", "cargo"),
    ("cargo.lock", "cargo"),
    ("package.json", "npm"),
    ("package-lock.json", "npm"),
    (".gitignore", "git"),
    (".gitmodules", "git"),
    ("init.lua", "lua"),
    ("license", "license"),
];

const EXTENSION_ICONS: &[(&str, &str)] = &[
    ("rs", "rust"),
    ("ts", "typescript"),
    ("mts", "typescript"),
    ("tsx", "react"),
    ("jsx", "react"),
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("py", "python"),
    ("go", "go"),
    ("rb", "ruby"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("scala", "scala"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("hpp", "cpp"),
    ("cs", "csharp"),
    ("fs", "fsharp"),
    ("php", "php"),
    ("swift", "swift"),
    ("dart", "dart"),
    ("lua", "lua"),
    ("vim", "vim"),
    ("hs", "haskell"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("erl", "erlang"),
    ("clj", "clojure"),
    ("zig", "zig"),
    ("nix", "nix"),
    ("md", "markdown"),
    ("json", "json"),
    ("toml", "toml"),
    ("yml", "yaml"),
    ("yaml", "yaml"),
    ("xml", "xml"),
    ("html", "html"),
    ("css", "css"),
    ("scss", "sass"),
    ("sass", "sass"),
    ("vue", "vue"),
    ("svelte", "svelte"),
    ("sh", "shell"),
    ("bash", "shell"),
    ("zsh", "shell"),
    ("fish", "shell"),
    ("sql", "database"),
    ("graphql", "graphql"),
    ("tex", "latex"),
];

const DETAILS_PREFIX: &str = "Editing ";

/// Resolves a file-type icon from an activity `details` line (`"Editing main.rs"`).
///
/// Returns `None` when there is no details line or nothing in the table matches,
/// in which case callers fall back to [`HOST_IMAGE_KEY`].
pub fn file_type_icon(details: Option<&str>) -> Option<&'static str> {
    let details = details?;
    let file_name = details
        .strip_prefix(DETAILS_PREFIX)
        .unwrap_or(details)
        .trim()
        .to_ascii_lowercase();

    if let Some((_, icon)) = FILE_NAME_ICONS.iter().find(|(name, _)| *name == file_name) {
        return Some(*icon);
    }

    let (_, extension) = file_name.rsplit_once('.')?;
    EXTENSION_ICONS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, icon)| *icon)
}
