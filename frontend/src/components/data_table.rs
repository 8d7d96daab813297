use shared::Record;
use yew::prelude::*;

use crate::services::format::PLACEHOLDER;

/// One rendered row: the record id (used as the row key and passed to the
/// action) and the already formatted cell texts
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub id: i64,
    pub cells: Vec<String>,
}

/// Project records onto `columns`, keeping the first `limit` records when a
/// limit is given. Null cells become the placeholder.
pub fn table_rows<'a, T, I>(records: I, columns: &[&str], limit: Option<usize>) -> Vec<TableRow>
where
    T: Record + 'a,
    I: IntoIterator<Item = &'a T>,
{
    records
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|record| TableRow {
            id: record.id(),
            cells: columns
                .iter()
                .map(|c| record.field(c).unwrap_or_else(|| PLACEHOLDER.to_string()))
                .collect(),
        })
        .collect()
}

/// Optional trailing button cell ("Edit", "✕")
#[derive(Clone, PartialEq)]
pub struct RowAction {
    pub label: AttrValue,
    pub title: AttrValue,
    pub class: AttrValue,
    pub on_click: Callback<i64>,
}

#[derive(Properties, PartialEq)]
pub struct DataTableProps {
    pub id: AttrValue,
    pub headers: Vec<AttrValue>,
    pub rows: Vec<TableRow>,
    #[prop_or_default]
    pub action: Option<RowAction>,
    #[prop_or_default]
    pub empty_text: Option<AttrValue>,
}

#[function_component(DataTable)]
pub fn data_table(props: &DataTableProps) -> Html {
    let column_count = props.headers.len() + usize::from(props.action.is_some());

    html! {
        <div class="table-container">
            <table id={props.id.clone()} class="data-table">
                <thead>
                    <tr>
                        {for props.headers.iter().map(|h| html! { <th>{h.clone()}</th> })}
                        {if props.action.is_some() { html! { <th></th> } } else { html! {} }}
                    </tr>
                </thead>
                <tbody>
                    {if props.rows.is_empty() {
                        match &props.empty_text {
                            Some(text) => html! {
                                <tr><td class="table-empty" colspan={column_count.to_string()}>{text.clone()}</td></tr>
                            },
                            None => html! {},
                        }
                    } else {
                        html! {
                            {for props.rows.iter().map(|row| {
                                html! {
                                    <tr key={row.id}>
                                        {for row.cells.iter().map(|cell| html! { <td>{cell}</td> })}
                                        {action_cell(props.action.as_ref(), row.id)}
                                    </tr>
                                }
                            })}
                        }
                    }}
                </tbody>
            </table>
        </div>
    }
}

fn action_cell(action: Option<&RowAction>, id: i64) -> Html {
    let Some(action) = action else {
        return html! {};
    };
    let onclick = {
        let on_click = action.on_click.clone();
        Callback::from(move |_: MouseEvent| on_click.emit(id))
    };
    html! {
        <td>
            <button type="button" class={action.class.clone()} title={action.title.clone()} {onclick}>
                {action.label.clone()}
            </button>
        </td>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::Litter;

    fn litter(id: i64, weaned: Option<i64>) -> Litter {
        Litter {
            litter_id: id,
            breeding_id: 10 + id,
            kindling_date: NaiveDate::from_ymd_opt(2024, 4, id as u32).unwrap(),
            born_alive: 6,
            born_dead: 1,
            weaned_count: weaned,
            notes: None,
        }
    }

    #[test]
    fn test_limit_keeps_first_rows_in_order() {
        let litters: Vec<Litter> = (1..=5).map(|i| litter(i, Some(5))).collect();
        let rows = table_rows(&litters, &["litter_id"], Some(2));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells, vec!["1"]);
        assert_eq!(rows[1].cells, vec!["2"]);
    }

    #[test]
    fn test_no_limit_renders_everything() {
        let litters: Vec<Litter> = (1..=5).map(|i| litter(i, None)).collect();
        assert_eq!(table_rows(&litters, &["litter_id"], None).len(), 5);
    }

    #[test]
    fn test_null_cells_show_placeholder() {
        let litters = vec![litter(3, None)];
        let rows = table_rows(&litters, &["litter_id", "kindling_date", "weaned_count"], None);

        assert_eq!(rows[0].id, 3);
        assert_eq!(rows[0].cells, vec!["3", "2024-04-03", PLACEHOLDER]);
    }

    #[test]
    fn test_same_input_gives_same_rows() {
        let litters = vec![litter(1, Some(4)), litter(2, None)];
        let cols = ["litter_id", "weaned_count"];
        assert_eq!(table_rows(&litters, &cols, None), table_rows(&litters, &cols, None));
    }
}
