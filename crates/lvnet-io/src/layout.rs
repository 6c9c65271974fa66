//! Positional column layout of the four input tables.
//!
//! Positions index the *numeric* columns of each table (see
//! [`crate::table::NumericTable`]). Defaults match the field-survey export
//! format; any position can be overridden from the `[columns]` section of the
//! configuration file.

use lvnet_core::{
    CircuitInput, LoadCurve, LvnetError, LvnetResult, NodeId, Segment, Transformer, User,
    MISSING_CODE,
};
use serde::{Deserialize, Serialize};

use crate::table::NumericTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformerColumns {
    pub node: usize,
    pub kind: usize,
    pub primary_voltage: usize,
    pub secondary_voltage: usize,
    pub topology: usize,
}

impl Default for TransformerColumns {
    fn default() -> Self {
        Self {
            node: 0,
            kind: 2,
            primary_voltage: 3,
            secondary_voltage: 4,
            topology: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentColumns {
    pub from: usize,
    pub to: usize,
    pub phase: usize,
    pub mounting: usize,
    pub phase_material: usize,
    pub neutral_material: usize,
}

impl Default for SegmentColumns {
    fn default() -> Self {
        Self {
            from: 0,
            to: 1,
            phase: 2,
            mounting: 4,
            phase_material: 6,
            neutral_material: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserColumns {
    pub node: usize,
    pub phase: usize,
    pub meter_type: usize,
    pub stratum: usize,
    pub service_class: usize,
}

impl Default for UserColumns {
    fn default() -> Self {
        Self {
            node: 0,
            phase: 1,
            meter_type: 4,
            stratum: 5,
            service_class: 6,
        }
    }
}

/// Column positions for every table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    #[serde(default)]
    pub transformer: TransformerColumns,
    #[serde(default)]
    pub segments: SegmentColumns,
    #[serde(default)]
    pub users: UserColumns,
}

/// The four tables of one circuit, as read from disk.
#[derive(Debug, Clone, Default)]
pub struct CircuitTables {
    pub transformer: NumericTable,
    pub segments: NumericTable,
    pub users: NumericTable,
    pub load_curve: NumericTable,
}

/// Integer code of a cell; missing or non-finite cells map to [`MISSING_CODE`].
pub fn code_from(value: f64) -> i64 {
    if value.is_finite() {
        value as i64
    } else {
        MISSING_CODE
    }
}

fn require_width(table: &NumericTable, needed: usize, name: &str) -> LvnetResult<()> {
    if !table.is_empty() && table.width() <= needed {
        return Err(LvnetError::Validation(format!(
            "{name} table has {} numeric column(s); layout needs column {needed}",
            table.width()
        )));
    }
    Ok(())
}

impl ColumnLayout {
    /// Builds the typed circuit input.
    ///
    /// The transformer table is flattened row by row and read positionally;
    /// positions past its end read as missing. Segment and user tables must
    /// be wide enough for every configured position.
    pub fn circuit_input(&self, tables: &CircuitTables) -> LvnetResult<CircuitInput> {
        Ok(CircuitInput {
            transformer: self.transformer(&tables.transformer),
            segments: self.segments(&tables.segments)?,
            users: self.users(&tables.users)?,
            load_curve: LoadCurve::new(tables.load_curve.flattened()),
        })
    }

    pub fn transformer(&self, table: &NumericTable) -> Transformer {
        let values = table.flattened();
        let at = |idx: usize| values.get(idx).copied().unwrap_or(f64::NAN);
        let cols = &self.transformer;
        Transformer::new(
            NodeId::new(code_from(at(cols.node))),
            code_from(at(cols.kind)),
            at(cols.primary_voltage),
            at(cols.secondary_voltage),
            code_from(at(cols.topology)),
        )
    }

    pub fn segments(&self, table: &NumericTable) -> LvnetResult<Vec<Segment>> {
        let cols = &self.segments;
        let widest = [
            cols.from,
            cols.to,
            cols.phase,
            cols.mounting,
            cols.phase_material,
            cols.neutral_material,
        ]
        .into_iter()
        .max()
        .unwrap_or(0);
        require_width(table, widest, "segment")?;
        if table.is_empty() {
            return Ok(Vec::new());
        }
        Ok(table
            .rows()
            .iter()
            .map(|row| Segment {
                from: NodeId::new(code_from(row[cols.from])),
                to: NodeId::new(code_from(row[cols.to])),
                phase_code: code_from(row[cols.phase]),
                mounting: code_from(row[cols.mounting]),
                phase_material: code_from(row[cols.phase_material]),
                neutral_material: code_from(row[cols.neutral_material]),
            })
            .collect())
    }

    pub fn users(&self, table: &NumericTable) -> LvnetResult<Vec<User>> {
        let cols = &self.users;
        let widest = [
            cols.node,
            cols.phase,
            cols.meter_type,
            cols.stratum,
            cols.service_class,
        ]
        .into_iter()
        .max()
        .unwrap_or(0);
        require_width(table, widest, "user")?;
        if table.is_empty() {
            return Ok(Vec::new());
        }
        Ok(table
            .rows()
            .iter()
            .map(|row| User {
                node: NodeId::new(code_from(row[cols.node])),
                phase_code: code_from(row[cols.phase]),
                meter_type: code_from(row[cols.meter_type]),
                stratum: code_from(row[cols.stratum]),
                service_class: code_from(row[cols.service_class]),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> NumericTable {
        NumericTable::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn transformer_reads_default_positions() {
        let t = ColumnLayout::default()
            .transformer(&table("node,id,kind,vp,vs,topo\n14,900,3,13200,220,1\n"));
        assert_eq!(t.node, NodeId::new(14));
        assert_eq!(t.kind_code, 3);
        assert_eq!(t.primary_voltage, 13200.0);
        assert_eq!(t.topology_flag, 1);
    }

    #[test]
    fn short_transformer_row_reads_missing() {
        let t = ColumnLayout::default().transformer(&table("node,id,kind\n14,900,1\n"));
        assert_eq!(t.kind_code, 1);
        assert!(t.primary_voltage.is_nan());
        assert_eq!(t.topology_flag, MISSING_CODE);
    }

    #[test]
    fn narrow_segment_table_is_rejected() {
        let err = ColumnLayout::default()
            .segments(&table("ni,nf,phase\n1,2,7\n"))
            .unwrap_err();
        assert!(matches!(err, LvnetError::Validation(_)));
    }

    #[test]
    fn custom_layout_reorders_columns() {
        let layout = ColumnLayout {
            segments: SegmentColumns {
                from: 1,
                to: 0,
                phase: 2,
                mounting: 3,
                phase_material: 3,
                neutral_material: 3,
            },
            ..ColumnLayout::default()
        };
        let segments = layout
            .segments(&table("nf,ni,phase,misc\n2,1,4,1\n"))
            .unwrap();
        assert_eq!(segments[0].from, NodeId::new(1));
        assert_eq!(segments[0].to, NodeId::new(2));
        assert_eq!(segments[0].phase_code, 4);
    }

    #[test]
    fn nan_cells_become_missing_codes() {
        assert_eq!(code_from(f64::NAN), MISSING_CODE);
        assert_eq!(code_from(6.0), 6);
    }
}
