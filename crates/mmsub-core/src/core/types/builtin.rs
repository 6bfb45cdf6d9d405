use phf::phf_map;

/// The universal wildcard symbol.
pub const WILDCARD_SYMBOL: &str = "00";

/// MacroModel-style atom types known without any registry file.
pub static BUILTIN_ATOM_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "C1" => "sp carbon",
    "C2" => "sp2 carbon",
    "C3" => "sp3 carbon",
    "CA" => "aromatic carbon",
    "H1" => "hydrogen on carbon",
    "H2" => "hydrogen on oxygen",
    "H3" => "hydrogen on nitrogen",
    "H4" => "hydrogen on sulfur",
    "H5" => "hydrogen on phosphorus",
    "H6" => "bridging hydrogen",
    "H7" => "hydride on a transition metal",
    "N1" => "sp nitrogen",
    "N2" => "sp2 nitrogen",
    "N3" => "sp3 nitrogen",
    "O2" => "sp2 oxygen",
    "O3" => "sp3 oxygen",
    "P0" => "trivalent phosphorus",
    "P1" => "tetravalent phosphorus",
    "S1" => "divalent sulfur",
    "F0" => "fluorine",
    "Cl" => "chlorine",
    "Br" => "bromine",
    "Rh" => "rhodium",
};

/// Equivalence classes known without any registry file, members separated by
/// whitespace.
pub static BUILTIN_CLASSES: phf::Map<&'static str, &'static str> = phf_map! {
    "HX" => "H1 H2 H3 H4 H5 H6 H7",
    "PX" => "P0 P1",
};
