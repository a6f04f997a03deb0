use crate::{
    cli::{AssociationAction, AssociationCommand, RelationKind},
    commands::print_json,
};
use gastro_review_associations::AssociationManager;
use gastro_review_database::{types::*, DatabaseStore, ReviewConnection};
use gastro_review_postgres::PgRelation;
use serde_json::json;
use std::str::FromStr;

pub async fn exec(command: AssociationCommand) -> anyhow::Result<()> {
    let (config, pool) = super::connect(command.args.clone()).await?;
    let conn = pool.acquire().await?;
    let paginator = Paginator::from(&config.pagination);

    match command.relation {
        RelationKind::RestaurantAddress => {
            run::<RestaurantAddress>(&command, conn, paginator).await
        }
        RelationKind::UserRole => run::<UserRole>(&command, conn, paginator).await,
        RelationKind::Friendship => run::<Friendship>(&command, conn, paginator).await,
        RelationKind::RestaurantCategory => {
            run::<RestaurantCategory>(&command, conn, paginator).await
        }
        RelationKind::UserAddress => run::<UserAddress>(&command, conn, paginator).await,
        RelationKind::FavoriteRestaurant => {
            run::<FavoriteRestaurant>(&command, conn, paginator).await
        }
    }
}

async fn run<R: PgRelation>(
    command: &AssociationCommand,
    conn: ReviewConnection,
    paginator: Paginator,
) -> anyhow::Result<()> {
    let mut manager =
        AssociationManager::<R, _>::new(DatabaseStore::<R>::new(conn)).with_paginator(paginator);

    match command.action {
        AssociationAction::Create => {
            let request = request_from::<R>(command, true)?;
            print_json(&manager.create(request).await?)
        }
        AssociationAction::Get => {
            let (owner, target) = key_from::<R>(command)?;
            print_json(&manager.get(owner, target).await?)
        }
        AssociationAction::Update => {
            let (owner, target) = key_from::<R>(command)?;
            let request = request_from::<R>(command, false)?;
            print_json(&manager.update(owner, target, request).await?)
        }
        AssociationAction::Delete => {
            let (owner, target) = key_from::<R>(command)?;
            manager.delete(owner.clone(), target.clone()).await?;
            print_json(&json!({
                "deleted": CompositeKey::new(owner, target),
            }))
        }
        AssociationAction::List => {
            let filter = filter_from::<R>(command)?;
            let page = manager.list(filter, command.page).await?;
            print_json(&json!({
                "total_pages": page.total_pages(),
                "page": page,
            }))
        }
    }
}

fn parse_side<T: FromStr>(relation: &str, side: Side, value: &str) -> anyhow::Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("`{value}` is not a valid {side} id for {relation}."))
}

fn key_from<R: Relation>(
    command: &AssociationCommand,
) -> anyhow::Result<(R::OwnerId, R::TargetId)> {
    let owner = command
        .owner
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("`--owner` is required."))?;
    let target = command
        .target
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("`--target` is required."))?;

    Ok((
        parse_side(R::NAME, Side::Owner, owner)?,
        parse_side(R::NAME, Side::Target, target)?,
    ))
}

/// Build a request from the command flags. On update the key flags address the
/// row instead, so they are left out of the request.
fn request_from<R: Relation>(
    command: &AssociationCommand,
    with_key: bool,
) -> anyhow::Result<AssociationRequest<R>> {
    let attributes: R::Patch = match &command.attributes {
        Some(json) => serde_json::from_str(json).map_err(|e| {
            anyhow::anyhow!("Invalid `--attributes` for {}: {e}", R::NAME)
        })?,
        None => R::Patch::default(),
    };

    let mut request = AssociationRequest::<R> {
        exclusive: command.exclusive,
        attributes,
        ..AssociationRequest::default()
    };

    if with_key {
        request.owner_id = command
            .owner
            .as_deref()
            .map(|owner| parse_side(R::NAME, Side::Owner, owner))
            .transpose()?;
        request.target_id = command
            .target
            .as_deref()
            .map(|target| parse_side(R::NAME, Side::Target, target))
            .transpose()?;
    }

    Ok(request)
}

fn filter_from<R: Relation>(command: &AssociationCommand) -> anyhow::Result<AssociationFilter<R>> {
    match (&command.by_owner, &command.by_target) {
        (Some(_), Some(_)) => {
            anyhow::bail!("`--by-owner` and `--by-target` cannot be combined.")
        }
        (Some(owner), None) => Ok(AssociationFilter::Owner(parse_side(
            R::NAME,
            Side::Owner,
            owner,
        )?)),
        (None, Some(target)) => Ok(AssociationFilter::Target(parse_side(
            R::NAME,
            Side::Target,
            target,
        )?)),
        (None, None) => Ok(AssociationFilter::All),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{GastroReview, Opt};
    use clap::Parser;

    fn command(args: &[&str]) -> AssociationCommand {
        let mut argv = vec!["gastro-review", "association"];
        argv.extend_from_slice(args);
        match Opt::try_parse_from(argv).unwrap().command {
            GastroReview::Association(command) => command,
            other => panic!("Unexpected command: {other:?}"),
        }
    }

    const RESTAURANT: &str = "9b2f6a4e-8a47-4c34-a3a5-0f1f3c2a9d10";

    #[test]
    fn test_create_request_carries_key_flag_and_attributes() {
        let command = command(&[
            "restaurant-address",
            "create",
            "--owner",
            RESTAURANT,
            "--target",
            "12",
            "--exclusive",
            "true",
            "--attributes",
            r#"{"branch_name":"Centro"}"#,
        ]);

        let request = request_from::<RestaurantAddress>(&command, true).unwrap();
        assert_eq!(request.owner_id, Some(RESTAURANT.parse().unwrap()));
        assert_eq!(request.target_id, Some(12));
        assert_eq!(request.exclusive, Some(true));
        assert_eq!(request.attributes.branch_name.as_deref(), Some("Centro"));
    }

    #[test]
    fn test_update_request_leaves_key_empty() {
        let command = command(&[
            "user-address",
            "update",
            "--owner",
            RESTAURANT,
            "--target",
            "4",
            "--attributes",
            r#"{"active":false}"#,
        ]);

        let request = request_from::<UserAddress>(&command, false).unwrap();
        assert!(request.owner_id.is_none());
        assert!(request.target_id.is_none());
        assert!(request.exclusive.is_none());
        assert_eq!(request.attributes.active, Some(false));
        assert!(request.attributes.address_type.is_none());

        let (owner, target) = key_from::<UserAddress>(&command).unwrap();
        assert_eq!(owner.to_string(), RESTAURANT);
        assert_eq!(target, 4);
    }

    #[test]
    fn test_bad_ids_and_attributes_are_rejected() {
        let command = command(&["user-role", "get", "--owner", RESTAURANT, "--target", "x"]);
        let err = key_from::<UserRole>(&command).unwrap_err();
        assert!(err.to_string().contains("not a valid target id"));

        let command = command_with_attributes("{\"branch_name\": 3}");
        assert!(request_from::<RestaurantAddress>(&command, true).is_err());
    }

    fn command_with_attributes(json: &str) -> AssociationCommand {
        command(&["restaurant-address", "create", "--attributes", json])
    }

    #[test]
    fn test_list_filters() {
        let all = command(&["restaurant-category", "list"]);
        assert!(matches!(
            filter_from::<RestaurantCategory>(&all).unwrap(),
            AssociationFilter::All
        ));

        let by_target = command(&["restaurant-category", "list", "--by-target", "5"]);
        assert!(matches!(
            filter_from::<RestaurantCategory>(&by_target).unwrap(),
            AssociationFilter::Target(5)
        ));

        let both = command(&[
            "restaurant-category",
            "list",
            "--by-owner",
            RESTAURANT,
            "--by-target",
            "5",
        ]);
        assert!(filter_from::<RestaurantCategory>(&both).is_err());
    }
}
