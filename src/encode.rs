//! Request encoder: typed parameters to a positional argument vector.
//!
//! Layout is `[capacity, (k | capacity2)?, item_count, item_1..n]` with one
//! comma-joined token per item. Validation happens here, against the
//! variant's closed shape descriptor, so malformed requests never reach a
//! solver process.

use crate::error::EncodeError;
use crate::request::{Item, ProblemParams};
use crate::variant::{ItemFields, LeadingArg, ProblemVariant};

/// Encode `(variant, params)` into the solver argument vector.
///
/// Pure and deterministic; the input is never mutated.
pub fn encode(variant: ProblemVariant, params: &ProblemParams) -> Result<Vec<String>, EncodeError> {
    let shape = variant.shape();
    let leading = validate_leading(variant, shape.leading, params)?;
    for (index, item) in params.items.iter().enumerate() {
        validate_item(variant, shape.fields, index, item, params.items.len())?;
    }

    let mut args = Vec::with_capacity(params.items.len() + 3);
    args.push(params.capacity.to_string());
    if let Some(leading) = leading {
        args.push(leading.to_string());
    }
    args.push(params.items.len().to_string());
    for item in &params.items {
        args.push(item_token(shape.fields, item));
    }
    Ok(args)
}

/// Returns the validated leading value to insert after `capacity`, if any.
fn validate_leading(
    variant: ProblemVariant,
    leading: LeadingArg,
    params: &ProblemParams,
) -> Result<Option<u64>, EncodeError> {
    if params.k.is_some() && params.capacity2.is_some() {
        return Err(EncodeError::ConflictingLeading);
    }
    match leading {
        LeadingArg::None => {
            if params.k.is_some() {
                return Err(EncodeError::UnexpectedLeading { variant, field: "k" });
            }
            if params.capacity2.is_some() {
                return Err(EncodeError::UnexpectedLeading {
                    variant,
                    field: "capacity2",
                });
            }
            Ok(None)
        }
        LeadingArg::K => match params.k {
            None => Err(EncodeError::MissingLeading { variant, field: "k" }),
            Some(0) => Err(EncodeError::ZeroK),
            Some(k) => Ok(Some(k)),
        },
        LeadingArg::Capacity2 => match params.capacity2 {
            None => Err(EncodeError::MissingLeading {
                variant,
                field: "capacity2",
            }),
            Some(capacity2) => Ok(Some(capacity2)),
        },
    }
}

fn validate_item(
    variant: ProblemVariant,
    fields: ItemFields,
    index: usize,
    item: &Item,
    len: usize,
) -> Result<(), EncodeError> {
    // Exactly the shape's extra field must be populated; anything else on the
    // item would silently change the token arity for the solver.
    let populated: [(&'static str, bool); 5] = [
        ("volume", item.volume.is_some()),
        ("count", item.count.is_some()),
        ("type", item.kind.is_some()),
        ("group", item.group.is_some()),
        ("parent", item.parent.is_some()),
    ];
    let required = fields.extra_field();
    for (field, present) in populated {
        if present && required != Some(field) {
            return Err(EncodeError::UnexpectedItemField {
                variant,
                index,
                field,
            });
        }
        if !present && required == Some(field) {
            return Err(EncodeError::MissingItemField {
                variant,
                index,
                field,
            });
        }
    }

    if item.count == Some(0) {
        return Err(EncodeError::ZeroCount { index });
    }
    if let Some(kind) = item.kind {
        if kind > 2 {
            return Err(EncodeError::KindOutOfRange { index, kind });
        }
    }
    if let Some(parent) = item.parent {
        if parent > len as u64 {
            return Err(EncodeError::ParentOutOfRange { index, parent, len });
        }
    }
    Ok(())
}

fn item_token(fields: ItemFields, item: &Item) -> String {
    match fields {
        ItemFields::Base => format!("{},{}", item.weight, item.value),
        ItemFields::Count => format!("{},{},{}", item.weight, item.value, item.count.unwrap_or(1)),
        ItemFields::Kind => format!("{},{},{}", item.weight, item.value, item.kind.unwrap_or(0)),
        ItemFields::Volume => format!(
            "{},{},{}",
            item.weight,
            item.volume.unwrap_or(0),
            item.value
        ),
        ItemFields::Group => format!("{},{},{}", item.weight, item.value, item.group.unwrap_or(0)),
        ItemFields::Parent => format!(
            "{},{},{}",
            item.weight,
            item.value,
            item.parent.unwrap_or(0)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(capacity: u64, items: Vec<Item>) -> ProblemParams {
        ProblemParams {
            capacity,
            capacity2: None,
            k: None,
            items,
        }
    }

    #[test]
    fn zero_one_layout_is_capacity_count_tokens() {
        let input = params(10, vec![Item::new(2, 3), Item::new(4, 5)]);
        let args = encode(ProblemVariant::ZeroOne, &input).expect("encode");
        assert_eq!(args, vec!["10", "2", "2,3", "4,5"]);
    }

    #[test]
    fn encoding_is_deterministic() {
        let input = params(7, vec![Item::new(1, 1), Item::new(2, 2), Item::new(3, 3)]);
        let first = encode(ProblemVariant::Unbounded, &input).expect("encode");
        let second = encode(ProblemVariant::Unbounded, &input).expect("encode again");
        assert_eq!(first, second);
    }

    #[test]
    fn item_order_is_preserved() {
        let items: Vec<Item> = (0..8).map(|i| Item::new(i, 100 - i)).collect();
        let input = params(50, items);
        let args = encode(ProblemVariant::ZeroOne, &input).expect("encode");
        for (i, token) in args[2..].iter().enumerate() {
            assert_eq!(token, &format!("{},{}", i, 100 - i));
        }
    }

    #[test]
    fn two_dimensional_item_orders_weight_volume_value() {
        let mut input = params(
            10,
            vec![Item {
                volume: Some(3),
                ..Item::new(2, 10)
            }],
        );
        input.capacity2 = Some(8);
        let args = encode(ProblemVariant::TwoDimensionalCost, &input).expect("encode");
        assert_eq!(args, vec!["10", "8", "1", "2,3,10"]);
    }

    #[test]
    fn kth_optimal_inserts_k_after_capacity() {
        let mut input = params(10, vec![Item::new(2, 3), Item::new(4, 5)]);
        input.k = Some(3);
        let args = encode(ProblemVariant::KthOptimal, &input).expect("encode");
        assert_eq!(&args[..3], ["10", "3", "2"]);
    }

    #[test]
    fn grouped_token_appends_group() {
        let input = params(
            9,
            vec![Item {
                group: Some(2),
                ..Item::new(5, 7)
            }],
        );
        let args = encode(ProblemVariant::Grouped, &input).expect("encode");
        assert_eq!(args[2], "5,7,2");
    }

    #[test]
    fn bounded_count_and_mixed_tokens() {
        let counted = params(
            9,
            vec![Item {
                count: Some(4),
                ..Item::new(3, 6)
            }],
        );
        let args = encode(ProblemVariant::BoundedCount, &counted).expect("encode");
        assert_eq!(args[2], "3,6,4");

        let mixed = params(
            9,
            vec![Item {
                kind: Some(1),
                ..Item::new(3, 6)
            }],
        );
        let args = encode(ProblemVariant::Mixed, &mixed).expect("encode");
        assert_eq!(args[2], "3,6,1");
    }

    #[test]
    fn dependency_parent_zero_is_root() {
        let input = params(
            12,
            vec![
                Item {
                    parent: Some(0),
                    ..Item::new(4, 8)
                },
                Item {
                    parent: Some(1),
                    ..Item::new(2, 3)
                },
            ],
        );
        let args = encode(ProblemVariant::Dependency, &input).expect("encode");
        assert_eq!(args[2..], ["4,8,0", "2,3,1"]);
    }

    #[test]
    fn k_and_capacity2_together_are_rejected() {
        let mut input = params(10, vec![Item::new(1, 1)]);
        input.k = Some(2);
        input.capacity2 = Some(5);
        let err = encode(ProblemVariant::KthOptimal, &input).unwrap_err();
        assert_eq!(err, EncodeError::ConflictingLeading);
    }

    #[test]
    fn missing_k_for_kth_optimal_is_rejected() {
        let input = params(10, vec![Item::new(1, 1)]);
        let err = encode(ProblemVariant::KthOptimal, &input).unwrap_err();
        assert!(matches!(err, EncodeError::MissingLeading { field: "k", .. }));
    }

    #[test]
    fn missing_capacity2_for_two_dimensional_is_rejected() {
        let input = params(
            10,
            vec![Item {
                volume: Some(1),
                ..Item::new(1, 1)
            }],
        );
        let err = encode(ProblemVariant::TwoDimensionalCost, &input).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::MissingLeading {
                field: "capacity2",
                ..
            }
        ));
    }

    #[test]
    fn stray_count_on_zero_one_is_rejected() {
        let input = params(
            10,
            vec![Item {
                count: Some(2),
                ..Item::new(1, 1)
            }],
        );
        let err = encode(ProblemVariant::ZeroOne, &input).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::UnexpectedItemField { field: "count", .. }
        ));
    }

    #[test]
    fn missing_group_on_grouped_is_rejected() {
        let input = params(10, vec![Item::new(1, 1)]);
        let err = encode(ProblemVariant::Grouped, &input).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::MissingItemField { field: "group", .. }
        ));
    }

    #[test]
    fn zero_count_and_bad_kind_are_rejected() {
        let zero_count = params(
            10,
            vec![Item {
                count: Some(0),
                ..Item::new(1, 1)
            }],
        );
        assert_eq!(
            encode(ProblemVariant::BoundedCount, &zero_count).unwrap_err(),
            EncodeError::ZeroCount { index: 0 }
        );

        let bad_kind = params(
            10,
            vec![Item {
                kind: Some(3),
                ..Item::new(1, 1)
            }],
        );
        assert_eq!(
            encode(ProblemVariant::Mixed, &bad_kind).unwrap_err(),
            EncodeError::KindOutOfRange { index: 0, kind: 3 }
        );
    }

    #[test]
    fn parent_past_item_count_is_rejected() {
        let input = params(
            10,
            vec![Item {
                parent: Some(2),
                ..Item::new(1, 1)
            }],
        );
        assert_eq!(
            encode(ProblemVariant::TreeDependency, &input).unwrap_err(),
            EncodeError::ParentOutOfRange {
                index: 0,
                parent: 2,
                len: 1
            }
        );
    }

    #[test]
    fn zero_k_is_rejected() {
        let mut input = params(10, vec![Item::new(1, 1)]);
        input.k = Some(0);
        assert_eq!(
            encode(ProblemVariant::KthOptimal, &input).unwrap_err(),
            EncodeError::ZeroK
        );
    }

    #[test]
    fn empty_item_list_still_encodes() {
        let input = params(10, Vec::new());
        let args = encode(ProblemVariant::Unbounded, &input).expect("encode");
        assert_eq!(args, vec!["10", "0"]);
    }
}
