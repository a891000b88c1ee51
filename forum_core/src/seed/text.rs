/// Localized names and descriptions of the default categories
#[derive(Debug, Clone, PartialEq)]
pub struct SeedText {
    pub uncategorized_name: String,
    pub meta_name: String,
    pub meta_description: String,
    pub staff_name: String,
    pub staff_description: String,
    pub general_name: String,
    pub general_description: String,
    /// Title of a category's description topic; `{category}` is replaced by its name
    pub topic_title_template: String,
}

impl Default for SeedText {
    fn default() -> Self {
        Self::english()
    }
}

impl SeedText {
    pub fn english() -> Self {
        Self {
            uncategorized_name: "Uncategorized".to_string(),
            meta_name: "Site Feedback".to_string(),
            meta_description: "Discussion about this site, its organization, how it works, \
                               and how we can improve it."
                .to_string(),
            staff_name: "Staff".to_string(),
            staff_description: "Private category for staff discussions. Topics are only \
                                visible to admins and moderators."
                .to_string(),
            general_name: "General".to_string(),
            general_description: "Create topics here that don't fit into any other existing \
                                  category."
                .to_string(),
            topic_title_template: "About the {category} category".to_string(),
        }
    }

    pub fn german() -> Self {
        Self {
            uncategorized_name: "Unkategorisiert".to_string(),
            meta_name: "Website-Feedback".to_string(),
            meta_description: "Diskussionen über diese Website, ihre Organisation, wie sie \
                               funktioniert und wie wir sie verbessern können."
                .to_string(),
            staff_name: "Team".to_string(),
            staff_description: "Private Kategorie für Diskussionen des Teams. Themen sind nur \
                                für Administratoren und Moderatoren sichtbar."
                .to_string(),
            general_name: "Allgemein".to_string(),
            general_description: "Erstelle hier Themen, die in keine andere Kategorie passen."
                .to_string(),
            topic_title_template: "Über die Kategorie {category}".to_string(),
        }
    }

    /// Text for `locale` such as `en`, `en_GB` or `de-AT`
    ///
    /// Unknown locales fall back to English.
    pub fn for_locale(locale: &str) -> Self {
        let language = locale
            .split(['_', '-'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match language.as_str() {
            "en" => Self::english(),
            "de" => Self::german(),
            _ => {
                tracing::debug!(locale, "No seed text for locale, using English");
                Self::english()
            }
        }
    }

    pub fn topic_title(&self, category: &str) -> String {
        self.topic_title_template.replace("{category}", category)
    }
}
