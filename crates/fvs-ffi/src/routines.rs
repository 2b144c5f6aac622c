// SPDX-License-Identifier: Apache-2.0
//! The closed set of FVS entry points this crate requires.
//!
//! Depending on the compiler and platform the library was built with, each
//! routine is exported either under its plain name (`fvsDimSizes`) or
//! lower-cased with a trailing underscore (`fvsdimsizes_`), the usual
//! gfortran decoration on Unix.

use std::fmt;

/// Number of required routines.
pub const ROUTINE_COUNT: usize = 19;

/// A logical FVS routine.
///
/// Variants are listed in declaration order; [`Routine::ALL`] and every
/// error that reports routines preserve this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Routine {
    Fvs,
    AddActivity,
    AddTrees,
    DimSizes,
    EvmonAttr,
    FfeAttrs,
    GetRestartCode,
    GetRtnCode,
    GetICCode,
    SvsDimSizes,
    SetStoppointCodes,
    SetCmdLine,
    SvsObjData,
    SpeciesAttr,
    SpeciesCode,
    StandId,
    Summary,
    TreeAttr,
    UnitConversion,
}

impl Routine {
    /// Every required routine, in declaration order.
    pub const ALL: [Routine; ROUTINE_COUNT] = [
        Routine::Fvs,
        Routine::AddActivity,
        Routine::AddTrees,
        Routine::DimSizes,
        Routine::EvmonAttr,
        Routine::FfeAttrs,
        Routine::GetRestartCode,
        Routine::GetRtnCode,
        Routine::GetICCode,
        Routine::SvsDimSizes,
        Routine::SetStoppointCodes,
        Routine::SetCmdLine,
        Routine::SvsObjData,
        Routine::SpeciesAttr,
        Routine::SpeciesCode,
        Routine::StandId,
        Routine::Summary,
        Routine::TreeAttr,
        Routine::UnitConversion,
    ];

    /// The plain exported name, e.g. `fvsGetRtnCode`.
    pub fn name(self) -> &'static str {
        match self {
            Routine::Fvs => "fvs",
            Routine::AddActivity => "fvsAddActivity",
            Routine::AddTrees => "fvsAddTrees",
            Routine::DimSizes => "fvsDimSizes",
            Routine::EvmonAttr => "fvsEvmonAttr",
            Routine::FfeAttrs => "fvsFFEAttrs",
            Routine::GetRestartCode => "fvsGetRestartCode",
            Routine::GetRtnCode => "fvsGetRtnCode",
            Routine::GetICCode => "fvsGetICCode",
            Routine::SvsDimSizes => "fvsSVSDimSizes",
            Routine::SetStoppointCodes => "fvsSetStoppointCodes",
            Routine::SetCmdLine => "fvsSetCmdLine",
            Routine::SvsObjData => "fvsSVSObjData",
            Routine::SpeciesAttr => "fvsSpeciesAttr",
            Routine::SpeciesCode => "fvsSpeciesCode",
            Routine::StandId => "fvsStandID",
            Routine::Summary => "fvsSummary",
            Routine::TreeAttr => "fvsTreeAttr",
            Routine::UnitConversion => "fvsUnitConversion",
        }
    }

    /// The Fortran-decorated name: lower-cased with a trailing `_`.
    pub fn decorated_name(self) -> String {
        format!("{}_", self.name().to_lowercase())
    }

    /// Position in [`Routine::ALL`].
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which spelling a routine was found under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spelling {
    /// The plain name, e.g. `fvsStandID`.
    Plain,
    /// Lower-cased with a trailing underscore, e.g. `fvsstandid_`.
    Decorated,
}

impl Spelling {
    /// The symbol name this spelling produces for `routine`.
    pub fn symbol(self, routine: Routine) -> String {
        match self {
            Spelling::Plain => routine.name().to_string(),
            Spelling::Decorated => routine.decorated_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_declaration_order() {
        for (i, routine) in Routine::ALL.iter().enumerate() {
            assert_eq!(routine.index(), i);
        }
        assert_eq!(Routine::ALL[0].name(), "fvs");
        assert_eq!(Routine::ALL[ROUTINE_COUNT - 1].name(), "fvsUnitConversion");
    }

    #[test]
    fn decorated_names() {
        assert_eq!(Routine::Fvs.decorated_name(), "fvs_");
        assert_eq!(Routine::SvsDimSizes.decorated_name(), "fvssvsdimsizes_");
        assert_eq!(Routine::GetICCode.decorated_name(), "fvsgeticcode_");
        assert_eq!(Spelling::Plain.symbol(Routine::StandId), "fvsStandID");
        assert_eq!(Spelling::Decorated.symbol(Routine::StandId), "fvsstandid_");
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = Routine::ALL.iter().map(|r| r.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ROUTINE_COUNT);
    }
}
