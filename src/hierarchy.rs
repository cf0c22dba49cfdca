//! Presentation forms of the current division table: a province → city →
//! area tree for cascading selectors, and a flat three-level map with parent
//! pointers.
//!
//! Both are built in a single pass over the table in dataset order. Tree
//! order is first-appearance order, not numeric order.

use std::collections::HashMap;

use division_types::{HierarchyNode, LeveledEntry, LeveledMap};
use tracing::debug;

use crate::code::{DIRECT_UNITS_LABEL, DivisionLevel, level_of};
use crate::error::Result;
use crate::store::{DataStore, DivisionMap};

/// Parent code of every level-1 entry.
pub const ROOT_CODE: &str = "0";

pub struct HierarchyBuilder<'a> {
    store: &'a DataStore,
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(store: &'a DataStore) -> Self {
        Self { store }
    }

    pub fn cascader_tree(&self) -> Result<Vec<HierarchyNode>> {
        Ok(build_cascader_tree(self.store.current()?))
    }

    pub fn leveled_map(&self) -> Result<LeveledMap> {
        Ok(build_leveled_map(self.store.current()?))
    }
}

// ── Cascader tree ────────────────────────────────────────────────────────

/// A province under construction with an index of its cities.
struct ProvinceSlot {
    node: HierarchyNode,
    cities: HashMap<String, usize>,
}

#[derive(Default)]
struct TreeBuilder {
    provinces: Vec<ProvinceSlot>,
    index: HashMap<String, usize>,
}

impl TreeBuilder {
    /// The province slot for `pp`, created nameless if not seen yet.
    fn province(&mut self, pp: &str) -> &mut ProvinceSlot {
        let i = match self.index.get(pp) {
            Some(&i) => i,
            None => {
                self.index.insert(pp.to_string(), self.provinces.len());
                self.provinces.push(ProvinceSlot {
                    node: HierarchyNode::new(pp, None),
                    cities: HashMap::new(),
                });
                self.provinces.len() - 1
            }
        };
        &mut self.provinces[i]
    }

    fn add_province(&mut self, pp: &str, name: &str) {
        self.province(pp).node.name = Some(name.to_string());
    }

    fn add_city(&mut self, pp: &str, cc: &str, name: &str) {
        let slot = self.province(pp);
        match slot.cities.get(cc) {
            // A synthesized "市辖区" city is renamed once the real entry shows up.
            Some(&i) => slot.node.children[i].name = Some(name.to_string()),
            None => {
                slot.cities.insert(cc.to_string(), slot.node.children.len());
                slot.node
                    .children
                    .push(HierarchyNode::new(cc, Some(name.to_string())));
            }
        }
    }

    fn add_area(&mut self, pp: &str, cc: &str, code: &str, name: &str) {
        let slot = self.province(pp);
        let i = match slot.cities.get(cc) {
            Some(&i) => i,
            None => {
                slot.cities.insert(cc.to_string(), slot.node.children.len());
                slot.node.children.push(HierarchyNode::new(
                    cc,
                    Some(DIRECT_UNITS_LABEL.to_string()),
                ));
                slot.node.children.len() - 1
            }
        };
        slot.node.children[i]
            .children
            .push(HierarchyNode::new(code, Some(name.to_string())));
    }

    fn finish(self) -> Vec<HierarchyNode> {
        self.provinces.into_iter().map(|slot| slot.node).collect()
    }
}

/// Province nodes carry the 2-digit province code, city nodes the 2-digit
/// city part (digits 3–4), area nodes the full 6-digit code.
pub fn build_cascader_tree(current: &DivisionMap) -> Vec<HierarchyNode> {
    let mut tree = TreeBuilder::default();

    for (code, name) in current.iter() {
        let Some(level) = level_of(code) else {
            debug!(code, "skipping non-division key in cascader tree");
            continue;
        };
        let (pp, cc) = (&code[..2], &code[2..4]);
        match level {
            DivisionLevel::Province => tree.add_province(pp, name),
            DivisionLevel::City => tree.add_city(pp, cc, name),
            DivisionLevel::Area => tree.add_area(pp, cc, code, name),
        }
    }

    tree.finish()
}

// ── Leveled map ──────────────────────────────────────────────────────────

pub fn build_leveled_map(current: &DivisionMap) -> LeveledMap {
    let mut map = LeveledMap::default();

    for (code, name) in current.iter() {
        let Some(level) = level_of(code) else {
            continue;
        };
        let key = code[..level.code_width()].to_string();
        let parent = match level {
            DivisionLevel::Province => ROOT_CODE.to_string(),
            DivisionLevel::City => code[..2].to_string(),
            DivisionLevel::Area => code[..4].to_string(),
        };
        let entry = LeveledEntry {
            name: name.clone(),
            parent,
        };
        match level {
            DivisionLevel::Province => map.level1.insert(key, entry),
            DivisionLevel::City => map.level2.insert(key, entry),
            DivisionLevel::Area => map.level3.insert(key, entry),
        };
    }

    // Areas directly under a municipality point at a city that has no entry
    // of its own; give it one so every parent pointer resolves.
    let orphan_parents: Vec<String> = map
        .level3
        .values()
        .map(|e| e.parent.clone())
        .filter(|cc| !map.level2.contains_key(cc))
        .collect();
    for cc in orphan_parents {
        let pp = cc[..2].to_string();
        map.level2.entry(cc).or_insert(LeveledEntry {
            name: DIRECT_UNITS_LABEL.to_string(),
            parent: pp,
        });
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, &str)]) -> DivisionMap {
        entries.iter().map(|&(c, n)| (c, n.to_string())).collect()
    }

    fn names(nodes: &[HierarchyNode]) -> Vec<Option<&str>> {
        nodes.iter().map(|n| n.name.as_deref()).collect()
    }

    // ── cascader_tree ────────────────────────────────────────────────

    #[test]
    fn test_three_level_tree() {
        let tree = build_cascader_tree(&table(&[
            ("130000", "河北省"),
            ("130100", "石家庄市"),
            ("130102", "长安区"),
            ("130104", "桥西区"),
            ("130200", "唐山市"),
            ("130202", "路南区"),
        ]));
        assert_eq!(tree.len(), 1);
        let hebei = &tree[0];
        assert_eq!(hebei.code, "13");
        assert_eq!(names(&hebei.children), vec![Some("石家庄市"), Some("唐山市")]);
        assert_eq!(hebei.children[0].code, "01");
        assert_eq!(
            names(&hebei.children[0].children),
            vec![Some("长安区"), Some("桥西区")]
        );
        assert_eq!(hebei.children[0].children[1].code, "130104");
        assert!(hebei.children[0].children[1].children.is_empty());
    }

    #[test]
    fn test_municipality_gets_synthesized_city() {
        let tree = build_cascader_tree(&table(&[
            ("110000", "北京市"),
            ("110101", "东城区"),
            ("110102", "西城区"),
        ]));
        let beijing = &tree[0];
        assert_eq!(beijing.children.len(), 1);
        assert_eq!(beijing.children[0].code, "01");
        assert_eq!(beijing.children[0].name.as_deref(), Some("市辖区"));
        assert_eq!(beijing.children[0].children.len(), 2);
    }

    #[test]
    fn test_missing_province_is_nameless_placeholder() {
        let tree = build_cascader_tree(&table(&[("320100", "南京市"), ("320102", "玄武区")]));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].code, "32");
        assert_eq!(tree[0].name, None);
        assert_eq!(tree[0].children[0].children[0].code, "320102");
    }

    #[test]
    fn test_late_entries_fill_placeholders_without_losing_children() {
        let tree = build_cascader_tree(&table(&[
            ("320102", "玄武区"),
            ("320100", "南京市"),
            ("320000", "江苏省"),
        ]));
        assert_eq!(tree[0].name.as_deref(), Some("江苏省"));
        assert_eq!(tree[0].children[0].name.as_deref(), Some("南京市"));
        assert_eq!(tree[0].children[0].children.len(), 1);
    }

    #[test]
    fn test_order_is_first_appearance_not_numeric() {
        let tree = build_cascader_tree(&table(&[
            ("440000", "广东省"),
            ("110000", "北京市"),
            ("440300", "深圳市"),
            ("440100", "广州市"),
        ]));
        assert_eq!(names(&tree), vec![Some("广东省"), Some("北京市")]);
        assert_eq!(names(&tree[0].children), vec![Some("深圳市"), Some("广州市")]);
    }

    #[test]
    fn test_non_division_keys_skipped() {
        let tree = build_cascader_tree(&table(&[("110000", "北京市"), ("note", "x"), ("1101", "y")]));
        assert_eq!(tree.len(), 1);
        assert!(tree[0].children.is_empty());
    }

    // ── leveled_map ──────────────────────────────────────────────────

    #[test]
    fn test_leveled_map_parents() {
        let map = build_leveled_map(&table(&[
            ("130000", "河北省"),
            ("130100", "石家庄市"),
            ("130102", "长安区"),
        ]));
        assert_eq!(
            map.get("13"),
            Some(&LeveledEntry {
                name: "河北省".into(),
                parent: "0".into()
            })
        );
        assert_eq!(map.get("1301").map(|e| e.parent.as_str()), Some("13"));
        assert_eq!(map.get("130102").map(|e| e.parent.as_str()), Some("1301"));
        assert_eq!(map.level1.len(), 1);
        assert_eq!(map.level2.len(), 1);
        assert_eq!(map.level3.len(), 1);
    }

    #[test]
    fn test_leveled_map_direct_units() {
        let map = build_leveled_map(&table(&[("110000", "北京市"), ("110101", "东城区")]));
        assert_eq!(
            map.get("1101"),
            Some(&LeveledEntry {
                name: "市辖区".into(),
                parent: "11".into()
            })
        );
        assert_eq!(map.get("110101").map(|e| e.parent.as_str()), Some("1101"));
    }

    #[test]
    fn test_builder_reads_store() {
        let store = DataStore::preloaded(
            table(&[("110000", "北京市"), ("110101", "东城区")]),
            DivisionMap::new(),
            Default::default(),
        );
        let builder = HierarchyBuilder::new(&store);
        assert_eq!(builder.cascader_tree().unwrap().len(), 1);
        assert_eq!(builder.leveled_map().unwrap().level3.len(), 1);
    }
}
