use super::columns::{audit, tracked_entity as col};
use super::{read_geometry, MapContext};
use crate::error::DecodingError;
use crate::model::{Attribute, FeatureType, SubCollection, TrackedEntityInstance};
use crate::row::ColumnReader;

pub(super) fn map(r: &ColumnReader<'_>, ctx: &MapContext<'_>) -> Result<TrackedEntityInstance, DecodingError> {
    let feature_type = r
        .enumeration::<FeatureType>(col::TYPE_FEATURE_TYPE)?
        .unwrap_or_default();
    let (geometry, coordinates) =
        read_geometry(r, ctx, col::GEOMETRY, feature_type == FeatureType::Point)?;

    let attributes = if ctx.include_all_attributes {
        read_attributes(r)
    } else {
        Vec::new()
    };

    Ok(TrackedEntityInstance {
        tracked_entity_instance: r.required_str(col::UID)?,
        tracked_entity_type: r.opt_str(col::TYPE_UID)?,
        org_unit: r.opt_str(col::ORG_UNIT_UID)?,
        created: r.iso_timestamp(audit::CREATED)?,
        last_updated: r.iso_timestamp(audit::LAST_UPDATED)?,
        created_at_client: r.iso_timestamp(audit::CREATED_AT_CLIENT)?,
        last_updated_at_client: r.iso_timestamp(audit::LAST_UPDATED_AT_CLIENT)?,
        inactive: r.bool_or_false(col::INACTIVE)?,
        deleted: r.bool_or_false(col::DELETED)?,
        potential_duplicate: r.bool_or_false(col::POTENTIAL_DUPLICATE)?,
        feature_type,
        geometry,
        coordinates,
        stored_by: r.opt_str(audit::STORED_BY)?,
        attributes,
        enrollments: SubCollection::NotFetched,
        relationships: SubCollection::NotFetched,
        program_owners: SubCollection::NotFetched,
    })
}

/// Every `attr_*` column in header order, rendered as text
fn read_attributes(r: &ColumnReader<'_>) -> Vec<Attribute> {
    r.row()
        .iter()
        .filter_map(|(column, value)| {
            let attribute = column.strip_prefix(col::ATTRIBUTE_PREFIX)?;
            Some(Attribute {
                attribute: attribute.to_string(),
                value: (!value.is_null()).then(|| value.to_string()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::geometry::{wkb, WkbDecoder};
    use crate::mapper::{MapContext, TRACKED_ENTITY_INSTANCE};
    use crate::model::FeatureType;
    use crate::row::{Row, Value};

    fn root_row() -> Row {
        Row::from_pairs([
            ("uid", Value::from("tei1")),
            ("type_uid", Value::from("person")),
            ("type_feature_type", Value::from("point")),
            ("ou_uid", Value::from("ouA")),
            ("created", Value::from("2021-01-02 03:04:05")),
            ("inactive", Value::Null),
            ("deleted", Value::Integer(0)),
            ("geometry", Value::Blob(wkb::point(10.0, 20.0))),
            ("attr_age", Value::Integer(42)),
            ("attr_name", Value::from("Jo")),
            ("attr_note", Value::Null),
        ])
    }

    #[test]
    fn test_maps_root_row() {
        let decoder = WkbDecoder;
        let ctx = MapContext::new(&decoder);
        let tei = TRACKED_ENTITY_INSTANCE.map_row(&root_row(), 0, &ctx).unwrap();

        assert_eq!(tei.tracked_entity_instance, "tei1");
        assert_eq!(tei.feature_type, FeatureType::Point);
        assert_eq!(tei.created.as_deref(), Some("2021-01-02T03:04:05.000"));
        assert!(!tei.inactive);
        assert!(!tei.deleted);
        assert_eq!(tei.coordinates.map(|c| (c.x, c.y)), Some((10.0, 20.0)));
        assert!(tei.enrollments.is_not_fetched());
        assert!(tei.attributes.is_empty());
    }

    #[test]
    fn test_attributes_read_only_when_requested() {
        let decoder = WkbDecoder;
        let ctx = MapContext {
            include_all_attributes: true,
            ..MapContext::new(&decoder)
        };
        let tei = TRACKED_ENTITY_INSTANCE.map_row(&root_row(), 0, &ctx).unwrap();

        let attrs: Vec<_> = tei
            .attributes
            .iter()
            .map(|a| (a.attribute.as_str(), a.value.as_deref()))
            .collect();
        assert_eq!(
            attrs,
            vec![("age", Some("42")), ("name", Some("Jo")), ("note", None)]
        );
    }
}
