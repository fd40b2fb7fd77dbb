//! Canonical documentation URLs for popular packages

/// Package name → documentation entry point
pub const KNOWN_PACKAGES: &[(&str, &str)] = &[
    ("react", "https://react.dev/reference/react"),
    ("react-dom", "https://react.dev/reference/react-dom"),
    ("next", "https://nextjs.org/docs"),
    ("vue", "https://vuejs.org/guide/introduction.html"),
    ("@angular/core", "https://angular.dev/overview"),
    ("svelte", "https://svelte.dev/docs"),
    ("express", "https://expressjs.com/en/4x/api.html"),
    ("lodash", "https://lodash.com/docs"),
    ("axios", "https://axios-http.com/docs/intro"),
    ("typescript", "https://www.typescriptlang.org/docs/"),
    ("jest", "https://jestjs.io/docs/getting-started"),
    ("vitest", "https://vitest.dev/guide/"),
    ("vite", "https://vite.dev/guide/"),
    ("webpack", "https://webpack.js.org/concepts/"),
    ("tailwindcss", "https://tailwindcss.com/docs"),
    ("redux", "https://redux.js.org/introduction/getting-started"),
    ("@reduxjs/toolkit", "https://redux-toolkit.js.org/introduction/getting-started"),
    ("zod", "https://zod.dev"),
    ("prisma", "https://www.prisma.io/docs"),
    ("mongoose", "https://mongoosejs.com/docs/"),
    ("eslint", "https://eslint.org/docs/latest/"),
    ("prettier", "https://prettier.io/docs/en/"),
    ("graphql", "https://graphql.org/learn/"),
    ("rxjs", "https://rxjs.dev/guide/overview"),
];

/// Documentation URL for `name` if it is a known package (case-insensitive)
#[must_use]
pub fn known_docs_url(name: &str) -> Option<&'static str> {
    let name = name.trim();
    KNOWN_PACKAGES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, url)| *url)
}
