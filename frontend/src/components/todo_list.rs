use shared::TodoItem;
use yew::prelude::*;

use crate::services::format::PLACEHOLDER;

#[derive(Properties, PartialEq)]
pub struct TodoListProps {
    pub title: AttrValue,
    pub items: Vec<TodoItem>,
    pub empty_text: AttrValue,
}

/// One to-do column: a count, then linked items or the empty text
#[function_component(TodoList)]
pub fn todo_list(props: &TodoListProps) -> Html {
    html! {
        <div class="todo-list">
            <h4>{props.title.clone()}<span class="count">{format!(" ({})", props.items.len())}</span></h4>
            if props.items.is_empty() {
                <p class="muted">{props.empty_text.clone()}</p>
            } else {
                <ul>
                    {for props.items.iter().map(|item| {
                        let label = item.label.clone().unwrap_or_else(|| PLACEHOLDER.to_string());
                        match &item.link {
                            Some(link) => html! { <li><a href={link.clone()}>{label}</a></li> },
                            None => html! { <li>{label}</li> },
                        }
                    })}
                </ul>
            }
        </div>
    }
}
