//! License notice written next to every bundled font
//!
//! The catalog distributes its families under the SIL Open Font License,
//! so one static notice is used for all of them.

/// File name of the notice inside each font directory
pub const LICENSE_FILE: &str = "LICENSE.txt";

pub fn license_notice(family: &str) -> String {
    format!(
        "{family}\n\
         {underline}\n\
         \n\
         This font family is distributed through the font catalog under the\n\
         SIL Open Font License, Version 1.1.\n\
         \n\
         You may use, study, modify and redistribute the font files, including\n\
         in commercial products, provided that:\n\
         \n\
         - the fonts are not sold by themselves,\n\
         - this notice and the copyright statements travel with the files,\n\
         - modified versions do not use the original Reserved Font Names.\n\
         \n\
         Family page: https://fonts.google.com/specimen/{specimen}\n\
         Full license text: https://openfontlicense.org/open-font-license-official-text/\n",
        underline = "=".repeat(family.chars().count()),
        specimen = family.trim().replace(' ', "+"),
    )
}
