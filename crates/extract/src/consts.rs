use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Program catalog (studiengaenge/suchen.html).
selector!(CATALOG_TABLE_SELECTOR, "table.table");
selector!(ROW_SELECTOR, "tr");
selector!(CELL_SELECTOR, "td");
selector!(ANCHOR_SELECTOR, "a[href]");
regex!(COMBINED_ID_REGEX, r"anzeigenKombiniert\.html\?(?:[^#]*&)?id=(\d+)");

// Combined program view (studiengaenge/anzeigenKombiniert.html).
selector!(TREEGRID_ROW_SELECTOR, "table[role=treegrid] tbody tr");
selector!(TREEGRID_SELECTOR, "table[role=treegrid]");
selector!(INDENT_SELECTOR, "span.ui-treetable-indent");
selector!(TOGGLER_SELECTOR, ".ui-treetable-toggler");
selector!(MODULE_LINK_SELECTOR, "a[href*='nummer=']");
regex!(MODULE_HREF_REGEX, r"[?&]nummer=(\d*)&(?:amp;)?version=(\d*)");
regex!(CREDITS_REGEX, r"^\s*(\d{1,3})(?:[.,]0+)?\s*(?:LP|ECTS)?\s*$");

// Module description (bolognamodule/beschreibung/anzeigen.html).
selector!(FACTS_SELECTOR, "dl.module-facts");
selector!(PARTS_TABLE_SELECTOR, "table.module-parts");
selector!(PARTS_ROW_SELECTOR, "tbody tr");
