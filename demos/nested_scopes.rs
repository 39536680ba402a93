//! Nested scopes: a subtree overrides a store without touching its parent

use cradle::{Merge, Registry, Store, StoreKey};

#[derive(Clone, Debug)]
struct Theme {
    name: String,
    dark: bool,
}

impl Merge for Theme {
    // Whole-value replacement: themes are swapped, not patched.
    type Patch = Theme;

    fn merge(&self, patch: Theme) -> Self {
        patch
    }
}

// A component somewhere down the tree: it only knows the key and whatever
// scope its parent handed it.
fn render_panel(scope: &Registry, theme_key: StoreKey<Theme>, label: &str) {
    let theme = scope
        .resolve(theme_key)
        .expect("theme store provided by an enclosing scope");
    theme.read(|t| {
        println!(
            "   [{label}] theme = {} (dark: {})",
            t.name, t.dark
        );
    });
}

fn main() {
    println!("=== Nested Scopes ===\n");

    println!("1. Bootstrap provides the default theme at the root");
    let default_theme = Store::new(Theme {
        name: "daylight".to_string(),
        dark: false,
    });
    let root = Registry::new().provide(&default_theme);
    let theme_key = default_theme.key();

    println!("\n2. Two siblings descend from the root scope");
    render_panel(&root, theme_key, "sidebar");
    render_panel(&root, theme_key, "editor");

    println!("\n3. The editor subtree overrides the theme for itself only");
    let midnight = Store::new(Theme {
        name: "midnight".to_string(),
        dark: true,
    });
    let editor_scope = root.provide_as(theme_key, &midnight);

    render_panel(&root, theme_key, "sidebar");
    render_panel(&editor_scope, theme_key, "editor");

    println!("\n4. Updating the override reaches the editor subtree alone");
    midnight.apply(Theme {
        name: "midnight-high-contrast".to_string(),
        dark: true,
    });
    render_panel(&root, theme_key, "sidebar");
    render_panel(&editor_scope, theme_key, "editor");

    println!("\n5. A never-provided store fails loudly");
    let stray = Store::new(Theme {
        name: "stray".to_string(),
        dark: false,
    });
    match root.resolve(stray.key()) {
        Ok(_) => unreachable!(),
        Err(err) => println!("   resolve error: {err}"),
    }

    println!("\n✓ Nested scopes complete!");
}
