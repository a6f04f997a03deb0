use crate::{
    cli::{EntityAction, EntityCommand},
    commands::print_json,
};
use anyhow::Context;
use gastro_review_database::{classify_entity_error, queries, types::*, ReviewConnection};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

pub async fn exec(command: EntityCommand) -> anyhow::Result<()> {
    let EntityCommand {
        kind,
        action,
        id,
        data,
        args,
    } = command;
    let kind = EntityKind::from(kind);

    let (_config, pool) = super::connect(args).await?;
    let mut conn = pool.acquire().await?;

    match action {
        EntityAction::Create => {
            let data = data.ok_or_else(|| {
                anyhow::anyhow!("`--data` is required to create a {kind}.")
            })?;
            create(&mut conn, kind, &data).await
        }
        EntityAction::Get => {
            let id = id.ok_or_else(|| anyhow::anyhow!("An id is required to get a {kind}."))?;
            get(&mut conn, kind, &id).await
        }
        EntityAction::Delete => {
            let id =
                id.ok_or_else(|| anyhow::anyhow!("An id is required to delete a {kind}."))?;
            delete(&mut conn, kind, &id).await
        }
    }
}

fn parse_data<T: DeserializeOwned>(kind: EntityKind, data: &str) -> anyhow::Result<T> {
    serde_json::from_str(data).with_context(|| format!("Invalid {kind} JSON body."))
}

fn parse_id<T: FromStr>(kind: EntityKind, id: &str) -> anyhow::Result<T> {
    id.parse()
        .map_err(|_| anyhow::anyhow!("`{id}` is not a valid {kind} id."))
}

async fn create(
    conn: &mut ReviewConnection,
    kind: EntityKind,
    data: &str,
) -> anyhow::Result<()> {
    let created = match kind {
        EntityKind::User => serde_json::to_value(
            queries::user_insert(conn, parse_data(kind, data)?)
                .await
                .map_err(|e| classify_entity_error(kind, e))?,
        )?,
        EntityKind::Restaurant => serde_json::to_value(
            queries::restaurant_insert(conn, parse_data(kind, data)?)
                .await
                .map_err(|e| classify_entity_error(kind, e))?,
        )?,
        EntityKind::Address => serde_json::to_value(
            queries::address_insert(conn, parse_data(kind, data)?)
                .await
                .map_err(|e| classify_entity_error(kind, e))?,
        )?,
        EntityKind::Role => serde_json::to_value(
            queries::role_insert(conn, parse_data(kind, data)?)
                .await
                .map_err(|e| classify_entity_error(kind, e))?,
        )?,
        EntityKind::Category => serde_json::to_value(
            queries::category_insert(conn, parse_data(kind, data)?)
                .await
                .map_err(|e| classify_entity_error(kind, e))?,
        )?,
    };

    info!("Created {kind} in `{}`.", kind.table_name());
    print_json(&created)
}

async fn get(conn: &mut ReviewConnection, kind: EntityKind, id: &str) -> anyhow::Result<()> {
    let found = match kind {
        EntityKind::User => queries::user_get(conn, parse_id::<Uuid>(kind, id)?)
            .await?
            .map(serde_json::to_value),
        EntityKind::Restaurant => {
            queries::restaurant_get(conn, parse_id::<Uuid>(kind, id)?)
                .await?
                .map(serde_json::to_value)
        }
        EntityKind::Address => queries::address_get(conn, parse_id::<i64>(kind, id)?)
            .await?
            .map(serde_json::to_value),
        EntityKind::Role => queries::role_get(conn, parse_id::<i32>(kind, id)?)
            .await?
            .map(serde_json::to_value),
        EntityKind::Category => queries::category_get(conn, parse_id::<i32>(kind, id)?)
            .await?
            .map(serde_json::to_value),
    };

    match found {
        Some(value) => print_json(&value?),
        None => anyhow::bail!("No {kind} with id `{id}`."),
    }
}

async fn delete(conn: &mut ReviewConnection, kind: EntityKind, id: &str) -> anyhow::Result<()> {
    let deleted = match kind {
        EntityKind::User => queries::user_delete(conn, parse_id(kind, id)?).await?,
        EntityKind::Restaurant => queries::restaurant_delete(conn, parse_id(kind, id)?).await?,
        EntityKind::Address => queries::address_delete(conn, parse_id(kind, id)?).await?,
        EntityKind::Role => queries::role_delete(conn, parse_id(kind, id)?).await?,
        EntityKind::Category => queries::category_delete(conn, parse_id(kind, id)?).await?,
    };

    if deleted == 0 {
        anyhow::bail!("No {kind} with id `{id}`.");
    }

    info!("Deleted {kind} `{id}`.");
    print_json(&json!({ "deleted": deleted }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_reports_the_entity_kind() {
        assert_eq!(parse_id::<i64>(EntityKind::Address, "17").unwrap(), 17);

        let err = parse_id::<Uuid>(EntityKind::User, "not-a-uuid").unwrap_err();
        assert_eq!(err.to_string(), "`not-a-uuid` is not a valid user id.");
    }

    #[test]
    fn test_parse_data_reads_new_entity_bodies() {
        let role: NewRole =
            parse_data(EntityKind::Role, r#"{"name":"moderator","description":null}"#)
                .unwrap();
        assert_eq!(role.name, "moderator");

        assert!(parse_data::<NewRole>(EntityKind::Role, "{").is_err());
    }
}
