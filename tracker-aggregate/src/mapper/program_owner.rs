use super::columns::program_owner as col;
use super::MapContext;
use crate::error::DecodingError;
use crate::model::ProgramOwner;
use crate::row::ColumnReader;

pub(super) fn map(r: &ColumnReader<'_>, _ctx: &MapContext<'_>) -> Result<ProgramOwner, DecodingError> {
    Ok(ProgramOwner {
        id: r.opt_i64(col::ID)?,
        tracked_entity_instance: r.required_str(col::TEI_UID)?,
        program: r.required_str(col::PROGRAM_UID)?,
        owner_org_unit: r.opt_str(col::OWNER_ORG_UNIT_UID)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::geometry::WkbDecoder;
    use crate::mapper::{MapContext, PROGRAM_OWNER};
    use crate::row::{Row, Value};

    #[test]
    fn test_maps_program_owner() {
        let decoder = WkbDecoder;
        let ctx = MapContext::new(&decoder);
        let row = Row::from_pairs([
            ("id", Value::Integer(17)),
            ("tei_uid", Value::from("tei1")),
            ("program_uid", Value::from("prgA")),
            ("ownerou_uid", Value::from("ouB")),
        ]);

        let owner = PROGRAM_OWNER.map_row(&row, 0, &ctx).unwrap();
        assert_eq!(owner.id, Some(17));
        assert_eq!(owner.program, "prgA");
        assert_eq!(owner.owner_org_unit.as_deref(), Some("ouB"));

        let json = serde_json::to_value(&owner).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["ownerOrgUnit"], "ouB");
    }

    #[test]
    fn test_program_is_required() {
        let decoder = WkbDecoder;
        let ctx = MapContext::new(&decoder);
        let row = Row::from_pairs([("tei_uid", "tei1")]);
        let err = PROGRAM_OWNER.map_row(&row, 0, &ctx).unwrap_err();
        assert_eq!(err.column, "program_uid");
    }
}
