//! Adjacency graph for the standard map.
//!
//! Each edge is stored once and is passable in both directions. Fleet edges
//! touching a split-coast province (bul, spa, stp) name the coast they use;
//! army edges always use `Coast::None`. The per-province index mirrors every
//! edge so lookups only ever scan the neighbours of one province.

use std::sync::LazyLock;

use super::province::{Coast, Province, PROVINCE_COUNT};
use super::unit::UnitType;

/// A directed view of an adjacency, as seen from `from`.
#[derive(Debug, Clone, Copy)]
pub struct AdjacencyEntry {
    pub from: Province,
    pub from_coast: Coast,
    pub to: Province,
    pub to_coast: Coast,
    pub army_ok: bool,
    pub fleet_ok: bool,
}

impl AdjacencyEntry {
    /// Returns true if a unit of the given type may use this edge.
    pub const fn passable_by(&self, unit_type: UnitType) -> bool {
        match unit_type {
            UnitType::Army => self.army_ok,
            UnitType::Fleet => self.fleet_ok,
            UnitType::Wing => true,
        }
    }

    const fn reversed(self) -> Self {
        AdjacencyEntry {
            from: self.to,
            from_coast: self.to_coast,
            to: self.from,
            to_coast: self.from_coast,
            army_ok: self.army_ok,
            fleet_ok: self.fleet_ok,
        }
    }
}

const fn edge(a: Province, ac: Coast, b: Province, bc: Coast, army_ok: bool, fleet_ok: bool) -> AdjacencyEntry {
    AdjacencyEntry {
        from: a,
        from_coast: ac,
        to: b,
        to_coast: bc,
        army_ok,
        fleet_ok,
    }
}
const fn army(a: Province, b: Province) -> AdjacencyEntry {
    edge(a, N, b, N, true, false)
}
const fn fleet(a: Province, b: Province) -> AdjacencyEntry {
    edge(a, N, b, N, false, true)
}
const fn fleet_c(a: Province, ac: Coast, b: Province, bc: Coast) -> AdjacencyEntry {
    edge(a, ac, b, bc, false, true)
}
const fn both(a: Province, b: Province) -> AdjacencyEntry {
    edge(a, N, b, N, true, true)
}

const N: Coast = Coast::None;
const NC: Coast = Coast::North;
const SC: Coast = Coast::South;
const EC: Coast = Coast::East;

use Province::*;

/// Number of undirected edges on the standard map.
pub const EDGE_COUNT: usize = 217;

/// Undirected edge table, grouped by the alphabetically smaller endpoint.
pub static EDGES: [AdjacencyEntry; EDGE_COUNT] = [
    fleet(Adr, Alb), fleet(Adr, Apu), fleet(Adr, Ion), fleet(Adr, Tri), fleet(Adr, Ven),
    fleet_c(Aeg, N, Bul, SC), fleet(Aeg, Con), fleet(Aeg, Eas), fleet(Aeg, Gre),
    fleet(Aeg, Ion), fleet(Aeg, Smy),
    both(Alb, Gre), fleet(Alb, Ion), army(Alb, Ser), both(Alb, Tri),
    both(Ank, Arm), fleet(Ank, Bla), both(Ank, Con), army(Ank, Smy),
    fleet(Apu, Ion), both(Apu, Nap), army(Apu, Rom), both(Apu, Ven),
    fleet(Arm, Bla), both(Arm, Sev), army(Arm, Smy), army(Arm, Syr),
    fleet(Bal, Ber), fleet(Bal, Bot), fleet(Bal, Den), fleet(Bal, Kie), fleet(Bal, Lvn),
    fleet(Bal, Pru), fleet(Bal, Swe),
    fleet(Bar, Nrg), fleet(Bar, Nwy), fleet_c(Bar, N, Stp, NC),
    army(Bel, Bur), fleet(Bel, Eng), both(Bel, Hol), fleet(Bel, Nth), both(Bel, Pic),
    army(Bel, Ruh),
    both(Ber, Kie), army(Ber, Mun), both(Ber, Pru), army(Ber, Sil),
    fleet_c(Bla, N, Bul, EC), fleet(Bla, Con), fleet(Bla, Rum), fleet(Bla, Sev),
    army(Boh, Gal), army(Boh, Mun), army(Boh, Sil), army(Boh, Tyr), army(Boh, Vie),
    fleet(Bot, Fin), fleet(Bot, Lvn), fleet_c(Bot, N, Stp, SC), fleet(Bot, Swe),
    fleet(Bre, Eng), both(Bre, Gas), fleet(Bre, Mao), army(Bre, Par), both(Bre, Pic),
    army(Bud, Gal), army(Bud, Rum), army(Bud, Ser), army(Bud, Tri), army(Bud, Vie),
    fleet_c(Bul, EC, Con, N), fleet_c(Bul, EC, Rum, N), army(Bul, Con), army(Bul, Gre),
    army(Bul, Rum), army(Bul, Ser), fleet_c(Bul, SC, Con, N), fleet_c(Bul, SC, Gre, N),
    army(Bur, Gas), army(Bur, Mar), army(Bur, Mun), army(Bur, Par), army(Bur, Pic),
    army(Bur, Ruh),
    both(Cly, Edi), both(Cly, Lvp), fleet(Cly, Nao), fleet(Cly, Nrg),
    both(Con, Smy),
    fleet(Den, Hel), both(Den, Kie), fleet(Den, Nth), fleet(Den, Ska), both(Den, Swe),
    fleet(Eas, Ion), fleet(Eas, Smy), fleet(Eas, Syr),
    army(Edi, Lvp), fleet(Edi, Nrg), fleet(Edi, Nth), both(Edi, Yor),
    fleet(Eng, Iri), fleet(Eng, Lon), fleet(Eng, Mao), fleet(Eng, Nth), fleet(Eng, Pic),
    fleet(Eng, Wal),
    army(Fin, Nwy), army(Fin, Stp), fleet_c(Fin, N, Stp, SC), both(Fin, Swe),
    army(Gal, Rum), army(Gal, Sil), army(Gal, Ukr), army(Gal, Vie), army(Gal, War),
    fleet(Gas, Mao), army(Gas, Mar), army(Gas, Par), army(Gas, Spa), fleet_c(Gas, N, Spa, NC),
    fleet(Gol, Mar), fleet(Gol, Pie), fleet_c(Gol, N, Spa, SC), fleet(Gol, Tus),
    fleet(Gol, Tys), fleet(Gol, Wes),
    fleet(Gre, Ion), army(Gre, Ser),
    fleet(Hel, Hol), fleet(Hel, Kie), fleet(Hel, Nth),
    fleet(Hol, Nth), army(Hol, Ruh),
    fleet(Ion, Nap), fleet(Ion, Tun), fleet(Ion, Tys),
    fleet(Iri, Lvp), fleet(Iri, Mao), fleet(Iri, Nao), fleet(Iri, Wal),
    army(Kie, Mun), army(Kie, Ruh),
    fleet(Lon, Nth), both(Lon, Wal), both(Lon, Yor),
    army(Lvn, Mos), both(Lvn, Pru), army(Lvn, Stp), fleet_c(Lvn, N, Stp, SC), army(Lvn, War),
    fleet(Lvp, Nao), both(Lvp, Wal), army(Lvp, Yor),
    fleet(Mao, Naf), fleet(Mao, Nao), fleet(Mao, Por), fleet_c(Mao, N, Spa, NC),
    fleet_c(Mao, N, Spa, SC), fleet(Mao, Wes),
    both(Mar, Pie), army(Mar, Spa), fleet_c(Mar, N, Spa, SC),
    army(Mos, Sev), army(Mos, Stp), army(Mos, Ukr), army(Mos, War),
    army(Mun, Ruh), army(Mun, Sil), army(Mun, Tyr),
    both(Naf, Tun), fleet(Naf, Wes),
    fleet(Nao, Nrg),
    both(Nap, Rom), fleet(Nap, Tys),
    fleet(Nrg, Nth), fleet(Nrg, Nwy),
    fleet(Nth, Nwy), fleet(Nth, Ska), fleet(Nth, Yor),
    fleet(Nwy, Ska), army(Nwy, Stp), fleet_c(Nwy, N, Stp, NC), both(Nwy, Swe),
    army(Par, Pic),
    both(Pie, Tus), army(Pie, Tyr), army(Pie, Ven),
    army(Por, Spa), fleet_c(Por, N, Spa, NC), fleet_c(Por, N, Spa, SC),
    army(Pru, Sil), army(Pru, War),
    both(Rom, Tus), fleet(Rom, Tys), army(Rom, Ven),
    army(Rum, Ser), both(Rum, Sev), army(Rum, Ukr),
    army(Ser, Tri),
    army(Sev, Ukr),
    army(Sil, War),
    fleet(Ska, Swe),
    both(Smy, Syr),
    fleet_c(Spa, SC, Wes, N),
    army(Tri, Tyr), both(Tri, Ven), army(Tri, Vie),
    fleet(Tun, Tys), fleet(Tun, Wes),
    fleet(Tus, Tys), army(Tus, Ven),
    army(Tyr, Ven), army(Tyr, Vie),
    fleet(Tys, Wes),
    army(Ukr, War),
    army(Wal, Yor),

];

/// Per-province slices into a mirrored copy of [`EDGES`].
struct AdjIndex {
    entries: Vec<AdjacencyEntry>,
    offsets: [(u16, u16); PROVINCE_COUNT],
}

static ADJ_INDEX: LazyLock<AdjIndex> = LazyLock::new(|| {
    let mut directed: Vec<AdjacencyEntry> = Vec::with_capacity(EDGE_COUNT * 2);
    for e in EDGES.iter() {
        directed.push(*e);
        directed.push(e.reversed());
    }
    directed.sort_by_key(|a| (a.from as u8, a.to as u8));

    let mut offsets = [(0u16, 0u16); PROVINCE_COUNT];
    let mut i = 0;
    for (p, slot) in offsets.iter_mut().enumerate() {
        let start = i;
        while i < directed.len() && directed[i].from as usize == p {
            i += 1;
        }
        *slot = (start as u16, i as u16);
    }

    AdjIndex {
        entries: directed,
        offsets,
    }
});

/// Returns the adjacency entries originating from the given province.
#[inline]
pub fn adj_from(prov: Province) -> &'static [AdjacencyEntry] {
    let idx = &*ADJ_INDEX;
    let (start, end) = idx.offsets[prov as usize];
    &idx.entries[start as usize..end as usize]
}

/// Coast filter shared by the lookups below: `Coast::None` on either side
/// matches anything.
fn coast_matches(wanted: Coast, actual: Coast) -> bool {
    wanted == Coast::None || actual == Coast::None || wanted == actual
}

/// Returns true if a unit of the given type can move from `src` to `dst`.
///
/// Coasts only constrain fleets; armies and wings ignore them.
pub fn is_adjacent(
    src: Province,
    src_coast: Coast,
    dst: Province,
    dst_coast: Coast,
    unit_type: UnitType,
) -> bool {
    let coasts_matter = unit_type == UnitType::Fleet;
    adj_from(src).iter().any(|adj| {
        adj.to == dst
            && adj.passable_by(unit_type)
            && (!coasts_matter
                || (coast_matches(src_coast, adj.from_coast)
                    && coast_matches(dst_coast, adj.to_coast)))
    })
}

/// Returns all coasts at the destination reachable by fleet from the given source and coast.
pub fn fleet_coasts_to(src: Province, src_coast: Coast, dst: Province) -> Vec<Coast> {
    let mut coasts = Vec::new();
    for adj in adj_from(src) {
        if adj.to != dst || !adj.fleet_ok || !coast_matches(src_coast, adj.from_coast) {
            continue;
        }
        if !coasts.contains(&adj.to_coast) {
            coasts.push(adj.to_coast);
        }
    }
    coasts
}

/// Returns all provinces a unit of the given type could step into from `prov`.
pub fn provinces_adjacent_to(prov: Province, coast: Coast, unit_type: UnitType) -> Vec<Province> {
    let mut result = Vec::new();
    for adj in adj_from(prov) {
        if !adj.passable_by(unit_type) {
            continue;
        }
        if unit_type == UnitType::Fleet && !coast_matches(coast, adj.from_coast) {
            continue;
        }
        if !result.contains(&adj.to) {
            result.push(adj.to);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::super::province::{ProvinceType, ALL_PROVINCES};
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn edges_are_unique() {
        let mut seen = HashSet::new();
        for e in EDGES.iter() {
            let key = (e.from as u8, e.from_coast, e.to as u8, e.to_coast);
            assert!(seen.insert(key), "duplicate edge {:?}", e);
            assert_ne!(e.from, e.to);
        }
    }

    #[test]
    fn every_province_has_a_neighbour() {
        for p in ALL_PROVINCES.iter() {
            assert!(!adj_from(*p).is_empty(), "{:?} has no adjacencies", p);
        }
    }

    #[test]
    fn index_is_symmetric() {
        for p in ALL_PROVINCES.iter() {
            for adj in adj_from(*p) {
                assert!(
                    adj_from(adj.to).iter().any(|r| r.to == *p
                        && r.to_coast == adj.from_coast
                        && r.army_ok == adj.army_ok
                        && r.fleet_ok == adj.fleet_ok),
                    "missing reverse of {:?}",
                    adj
                );
            }
        }
    }

    #[test]
    fn inland_provinces_have_no_fleet_edges() {
        for p in ALL_PROVINCES.iter().filter(|p| p.province_type() == ProvinceType::Land) {
            assert!(provinces_adjacent_to(*p, Coast::None, UnitType::Fleet).is_empty());
        }
    }

    #[test]
    fn known_adjacencies() {
        assert!(is_adjacent(Ank, N, Arm, N, UnitType::Army));
        assert!(is_adjacent(Ank, N, Bla, N, UnitType::Fleet));
        assert!(!is_adjacent(Ank, N, Bla, N, UnitType::Army));
        assert!(is_adjacent(Rom, N, Ven, N, UnitType::Army));
        assert!(!is_adjacent(Rom, N, Ven, N, UnitType::Fleet));
        assert!(!is_adjacent(Gas, N, Mar, N, UnitType::Fleet));
    }

    #[test]
    fn split_coasts_constrain_fleets() {
        assert!(is_adjacent(Stp, SC, Bot, N, UnitType::Fleet));
        assert!(!is_adjacent(Stp, NC, Bot, N, UnitType::Fleet));
        assert_eq!(fleet_coasts_to(Mao, N, Spa), vec![NC, SC]);
        assert_eq!(fleet_coasts_to(Gol, N, Spa), vec![SC]);
        assert_eq!(fleet_coasts_to(Bla, N, Bul), vec![EC]);
    }

    #[test]
    fn wings_use_any_edge() {
        assert!(is_adjacent(Lon, N, Nth, N, UnitType::Wing));
        assert!(is_adjacent(Boh, N, Vie, N, UnitType::Wing));
        assert!(!is_adjacent(Lon, N, Par, N, UnitType::Wing));
    }
}
